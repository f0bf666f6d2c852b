//! Service configuration from environment variables

/// Bot service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub transport_base_url: String,
    pub transport_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = std::env::var("CONCIERGE_DB_PATH").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            format!("{home}/.concierge/concierge.db")
        });

        let port = std::env::var("CONCIERGE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        Self {
            db_path,
            port,
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            transport_base_url: std::env::var("CONCIERGE_TRANSPORT_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            transport_token: std::env::var("CONCIERGE_TRANSPORT_TOKEN").ok(),
        }
    }
}
