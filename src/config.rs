//! Server configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SUPERADMIN_EMAIL: &str = "admin@gug.de";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Login email that is granted the Superadmin role.
    pub superadmin_email: String,
    /// Load the demo club data at startup.
    pub seed_demo: bool,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            superadmin_email: DEFAULT_SUPERADMIN_EMAIL.to_owned(),
            seed_demo: true,
            cookie_secure: false,
        }
    }
}

impl ServerConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `GUG_SUPERADMIN_EMAIL`: default `admin@gug.de`
    /// - `GUG_SEED_DEMO`: default true
    /// - `GUG_COOKIE_SECURE`: default false
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            Err(_) => defaults.port,
        };

        let superadmin_email = std::env::var("GUG_SUPERADMIN_EMAIL")
            .ok()
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.superadmin_email);

        let seed_demo = env_flag("GUG_SEED_DEMO")?.unwrap_or(defaults.seed_demo);
        let cookie_secure = env_flag("GUG_COOKIE_SECURE")?.unwrap_or(defaults.cookie_secure);

        Ok(Self { port, superadmin_email, seed_demo, cookie_secure })
    }
}

fn env_flag(key: &'static str) -> Result<Option<bool>, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    parse_bool(&raw)
        .map(Some)
        .ok_or(ConfigError::Invalid { var: key, value: raw })
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
