use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub gemini_timeout_secs: u64,

    pub knowledge_base_path: String,
    pub static_dir: String,
    pub templates_dir: String,

    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://mindful.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()
                .unwrap_or(5000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5000".into()),

            google_api_key: env::var("GOOGLE_API_KEY").ok().filter(|s| !s.is_empty()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".into()),
            gemini_api_base: env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            gemini_timeout_secs: env::var("GEMINI_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),

            knowledge_base_path: env::var("KNOWLEDGE_BASE_PATH")
                .unwrap_or_else(|_| "knowledge_base.json".into()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()),
            templates_dir: env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".into()),

            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    /// Defaults with no credential, used by tests and local tooling.
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 5000,
            frontend_url: "http://localhost:5000".into(),
            google_api_key: None,
            gemini_model: "gemini-1.5-flash".into(),
            gemini_api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            gemini_timeout_secs: 60,
            knowledge_base_path: "knowledge_base.json".into(),
            static_dir: "static".into(),
            templates_dir: "templates".into(),
            rate_limit_max: 10,
            rate_limit_window_secs: 60,
        }
    }
}
