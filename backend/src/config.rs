use config::{Config, ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;

fn default_port() -> u16 {
    8080
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub jwt_secret: String,
    /// Email granted access to the admin endpoints.
    pub admin_email: String,
    /// Directory listing images are written to and served from.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present
        Config::builder()
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
