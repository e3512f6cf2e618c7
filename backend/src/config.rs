use tracing::warn;

// Defaults used when the environment leaves them unset
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite:backoffice.db";

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub database_url: String,
}

impl Settings {
    /// Load settings from the environment
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("PORT").ok(),
            std::env::var("DATABASE_URL").ok(),
        )
    }

    fn from_vars(port: Option<String>, database_url: Option<String>) -> Self {
        let port = match port {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    warn!("Ignoring non-numeric PORT value: {}", raw);
                    DEFAULT_PORT
                }
            },
            None => DEFAULT_PORT,
        };

        let database_url = database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Self { port, database_url }
    }
}
