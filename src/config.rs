use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub request: RequestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub seed_username: String,
    pub seed_password: String,
    pub reset_token_ttl_secs: i64,
    pub login_redirect: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RequestConfig {
    pub max_body_size: usize,  // in bytes
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // e.g. APP__SERVER__PORT=8080, APP__STORE__BACKEND=memory
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
impl Config {
    pub fn in_memory() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                redis_url: "redis://127.0.0.1:6379".into(),
            },
            auth: AuthConfig {
                seed_username: "yugdeep".into(),
                seed_password: "989814yug".into(),
                reset_token_ttl_secs: 3600,
                login_redirect: "/dashboard".into(),
            },
            request: RequestConfig {
                max_body_size: 64 * 1024,
            },
        }
    }
}
