//! Configuration: TOML file, environment and command-line precedence.

pub mod loader;

pub use loader::{
    default_config_path, default_log_path, default_state_path, load_config_file,
    load_config_with_precedence, resolve, ConfigError, ConfigFile, ResolvedConfig,
    CONFIG_ENV_VAR, STATE_FILE_ENV_VAR,
};
