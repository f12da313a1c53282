use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by layering a TOML file and
    /// `APP_`-prefixed environment variables over the built-in defaults.
    ///
    /// Env overrides use `__` as the section separator, e.g.
    /// `APP_WEBHOOK__PASSWORD` or `APP_SERVER__PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ConfigLoader::load("/nonexistent/Config.toml").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.webhook.default_percent, 5);
        assert!(config.webhook.enforce_ip_allowlist);
        assert_eq!(config.webhook.allowed_ips.len(), 4);
    }
}
