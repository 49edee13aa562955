// Configuration module entry point
// Loads layered configuration and owns the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::{AppState, StateError};
pub use types::{
    ArticlesConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    SessionConfig, StorageConfig,
};

/// Environment variable prefix, e.g. `BROADSHEET__SERVER__PORT=8080`
const ENV_PREFIX: &str = "BROADSHEET";

impl Config {
    /// Load configuration from `config.toml` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Missing files are fine: defaults apply, then the file, then environment.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace", 5)?
            .set_default("http.server_name", "broadsheet")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("storage.public_dir", "public")?
            .set_default("storage.uploads_dir", "public/uploads")?
            .set_default("storage.max_upload_size", 5_242_880)? // 5MB
            .set_default("session.cookie_name", "broadsheet.sid")?
            .set_default("session.max_age_secs", 60)?
            .set_default("articles.seed", true)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
