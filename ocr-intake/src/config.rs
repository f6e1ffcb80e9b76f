//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `OCR_INTAKE_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `OCR_INTAKE_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `OCR_INTAKE_OCR__MAX_FILE_SIZE=5242880` sets the `ocr.max_file_size` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Upload policy**: `ocr.max_file_size`, `ocr.allowed_extensions`, `ocr.upload_folder`
//! - **CORS**: `cors.allowed_origins`, `cors.allow_credentials`, `cors.max_age`
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! OCR_INTAKE_PORT=8080
//!
//! # Override upload policy values
//! OCR_INTAKE_OCR__MAX_FILE_SIZE=5242880
//! OCR_INTAKE_OCR__UPLOAD_FOLDER=/var/lib/ocr-intake/uploads
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::PathBuf};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "OCR_INTAKE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Upload acceptance policy and storage location
    pub ocr: OcrConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Upload acceptance policy.
///
/// Handlers read these values on every request; there is no separate cache of
/// the policy anywhere else in the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OcrConfig {
    /// Maximum accepted upload size in bytes. Uploads of exactly this size are
    /// still accepted; anything larger is rejected.
    pub max_file_size: u64,
    /// Filename extensions accepted for upload. Matching is case-insensitive;
    /// entries are lower-cased when the config is loaded.
    pub allowed_extensions: HashSet<String>,
    /// Directory uploaded files are written to. Created on demand, including
    /// missing parents.
    pub upload_folder: PathBuf,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            ocr: OcrConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MiB
            allowed_extensions: ["jpg", "jpeg", "png", "pdf"].into_iter().map(String::from).collect(),
            upload_folder: PathBuf::from("uploads"),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                CorsOrigin::Url(Url::parse("http://localhost:5173").unwrap()), // Development frontend (Vite)
            ],
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // The allow-set matches case-insensitively; store it lower-cased once
        // so handlers compare without re-normalizing.
        config.ocr.allowed_extensions = std::mem::take(&mut config.ocr.allowed_extensions)
            .into_iter()
            .map(|ext| ext.to_lowercase())
            .collect();

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.ocr.max_file_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: ocr.max_file_size cannot be 0. Set a positive byte count (default: 10485760 = 10 MiB)."
                    .to_string(),
            });
        }

        if self.ocr.allowed_extensions.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: ocr.allowed_extensions cannot be empty. Every upload would be rejected; \
                            list the extensions to accept (e.g. [jpg, png, pdf])."
                    .to_string(),
            });
        }

        // Validate CORS configuration
        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        // Validate that wildcard is not used with credentials
        let has_wildcard = self.cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if has_wildcard && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values.
            // OCR_INTAKE_CONFIG names the config file (read by Args), so it is
            // not a key of the config itself.
            .merge(Env::prefixed("OCR_INTAKE_").split("__").ignore(&["config"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_config_file() {
        Jail::expect_with(|_jail| {
            let args = Args {
                config: "missing.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8000);
            assert_eq!(config.ocr.max_file_size, 10 * 1024 * 1024);
            assert!(config.ocr.allowed_extensions.contains("jpg"));
            assert!(config.ocr.allowed_extensions.contains("pdf"));
            assert_eq!(config.ocr.upload_folder, PathBuf::from("uploads"));

            Ok(())
        });
    }

    #[test]
    fn test_ocr_yaml_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 9000
ocr:
  max_file_size: 1048576
  allowed_extensions: [tiff, bmp]
  upload_folder: /srv/scans
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.port, 9000);
            assert_eq!(config.ocr.max_file_size, 1048576);
            assert!(config.ocr.allowed_extensions.contains("tiff"));
            assert!(config.ocr.allowed_extensions.contains("bmp"));
            assert!(!config.ocr.allowed_extensions.contains("jpg"));
            assert_eq!(config.ocr.upload_folder, PathBuf::from("/srv/scans"));

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 10.0.0.1
ocr:
  max_file_size: 1048576
"#,
            )?;

            jail.set_env("OCR_INTAKE_PORT", "8080");
            jail.set_env("OCR_INTAKE_OCR__MAX_FILE_SIZE", "2048");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            // Env vars should override
            assert_eq!(config.port, 8080);
            assert_eq!(config.ocr.max_file_size, 2048);

            // YAML values should be preserved
            assert_eq!(config.host, "10.0.0.1");

            Ok(())
        });
    }

    #[test]
    fn test_config_file_env_var_is_not_a_config_key() {
        Jail::expect_with(|jail| {
            // The variable clap reads for the config file path shares the env
            // prefix; loading must not reject it as an unknown field.
            jail.set_env("OCR_INTAKE_CONFIG", "missing.yaml");

            let args = Args {
                config: "missing.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.port, 8000);

            Ok(())
        });
    }

    #[test]
    fn test_allowed_extensions_lowercased_on_load() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
ocr:
  allowed_extensions: [JPG, Png, pdf]
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert!(config.ocr.allowed_extensions.contains("jpg"));
            assert!(config.ocr.allowed_extensions.contains("png"));
            assert!(config.ocr.allowed_extensions.contains("pdf"));
            assert!(!config.ocr.allowed_extensions.contains("JPG"));

            Ok(())
        });
    }

    #[test]
    fn test_config_validation_zero_max_file_size() {
        let mut config = Config::default();
        config.ocr.max_file_size = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_file_size"));
    }

    #[test]
    fn test_config_validation_empty_allowed_extensions() {
        let mut config = Config::default();
        config.ocr.allowed_extensions.clear();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("allowed_extensions"));
    }

    #[test]
    fn test_config_validation_wildcard_with_credentials() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        config.cors.allow_credentials = true;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("wildcard"));
    }

    #[test]
    fn test_config_validation_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }
}
