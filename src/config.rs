use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendProvider {
    Supabase,
    Memory,
}

impl std::str::FromStr for BackendProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "supabase" => Ok(Self::Supabase),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub backend_provider: BackendProvider,
    pub baas_url: String,
    pub baas_anon_key: String,
    pub baas_jwt_secret: String,
    pub baas_jwt_audience: String,
    pub baas_timeout_secs: u64,
    /// Public origin of the web client, used for CORS and auth email redirects.
    pub site_url: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let backend_provider: BackendProvider = match env::var("BACKEND_PROVIDER") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("Invalid value for BACKEND_PROVIDER: {}", e)))?,
            Err(_) => BackendProvider::Supabase,
        };

        // The in-memory provider needs no remote project.
        let (baas_url, baas_anon_key) = match backend_provider {
            BackendProvider::Supabase => (get_env("BAAS_URL")?, get_env("BAAS_ANON_KEY")?),
            BackendProvider::Memory => (
                env::var("BAAS_URL").unwrap_or_else(|_| "http://localhost:54321".to_string()),
                env::var("BAAS_ANON_KEY").unwrap_or_default(),
            ),
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            backend_provider,
            baas_url,
            baas_anon_key,
            baas_jwt_secret: get_env("BAAS_JWT_SECRET")?,
            baas_jwt_audience: env::var("BAAS_JWT_AUDIENCE")
                .unwrap_or_else(|_| "authenticated".to_string()),
            baas_timeout_secs: get_env_parse_or("BAAS_TIMEOUT_SECS", 30)?,
            site_url: env::var("SITE_URL").ok().filter(|s| !s.trim().is_empty()),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
