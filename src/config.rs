//! Application configuration
//! Environment variable loading and validation for the bridge service.

use std::env;

/// Main application configuration. Provider credentials load separately in
/// the payments module.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub enum LogFormat {
    Json,
    Plain,
}

/// URLs the payment flow hands to the outside world.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Public base of this service; return/cancel URLs are built from it.
    pub public_base_url: String,
    /// Landing page the validation callback redirects to.
    pub front_url: String,
    /// Merchant signature key for webhook verification. Unset skips the
    /// check.
    pub webhook_signature_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            site: SiteConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logging.validate()?;
        self.site.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }
        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }
        Ok(())
    }
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(SiteConfig {
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map_err(|_| ConfigError::MissingVariable("PUBLIC_BASE_URL".to_string()))?,
            front_url: env::var("FRONT_URL").unwrap_or_else(|_| "/".to_string()),
            webhook_signature_key: env::var("AUTHNET_SIGNATURE_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.public_base_url.starts_with("http://")
            && !self.public_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue(
                "PUBLIC_BASE_URL must be a valid URL".to_string(),
            ));
        }
        if self.front_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "FRONT_URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        };
        assert!(config.validate().is_ok());

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn site_config_requires_http_base_url() {
        let config = SiteConfig {
            public_base_url: "example.com".to_string(),
            front_url: "/".to_string(),
            webhook_signature_key: None,
        };
        assert!(config.validate().is_err());

        let config = SiteConfig {
            public_base_url: "https://example.com".to_string(),
            front_url: "/".to_string(),
            webhook_signature_key: None,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn log_level_validation() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Plain,
        };
        assert!(config.validate().is_ok());

        let config = LoggingConfig {
            level: "loud".to_string(),
            format: LogFormat::Plain,
        };
        assert!(config.validate().is_err());
    }
}
