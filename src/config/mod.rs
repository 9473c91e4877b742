//! Client configuration and API key persistence.
//!
//! Two concerns live here:
//!
//! - [`ClientConfig`] / [`ClientConfigBuilder`]: the validated, immutable
//!   configuration a [`crate::ChatClient`] is constructed from (API key,
//!   model, base URL, default max tokens), with environment-variable
//!   defaults resolved at build time.
//! - [`ConfigStore`]: the persisted `config.json` holding the user's API
//!   key, plus the status query the settings UI consumes.
//!
//! # Example
//!
//! ```no_run
//! use claudechat::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .api_key("sk-ant-...")
//!     .model("claude-sonnet-4-5-20250929")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.max_tokens(), claudechat::config::DEFAULT_MAX_TOKENS);
//! ```

mod builder;
mod store;

pub use builder::{ClientConfig, ClientConfigBuilder};
pub use store::{ApiKeyStatus, ConfigStore, CONFIG_FILE_NAME};

/// Model used when neither the builder nor the environment specifies one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default generation budget in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// API endpoint used when no base URL override is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Environment variable holding the API key (used for one-time migration
/// into the config file).
pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the model.
pub const ENV_MODEL: &str = "ANTHROPIC_MODEL";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
