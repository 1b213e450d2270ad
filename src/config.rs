//! Command-line arguments and the optional TOML config file.
//!
//! Values resolve in three layers: flags (and `GOUP_DASH_API`) win over the
//! file, the file wins over the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API: &str = "http://127.0.0.1:6007";
pub const DEFAULT_POLL_MS: u64 = 16;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_START: &str = "/";

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "goup-dash",
    version = env!("CARGO_PKG_VERSION"),
    about = "Terminal control dashboard for a goup server"
)]
pub struct Args {
    /// Base URL of the goup REST API.
    #[arg(long, value_name = "URL", env = "GOUP_DASH_API")]
    pub api: Option<String>,

    /// TOML file supplying any of the other settings.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path of the first view to open.
    #[arg(short, long, value_name = "PATH")]
    pub start: Option<String>,

    /// Input poll interval; also paces redraws.
    #[arg(long, value_name = "MS")]
    pub poll_ms: Option<u64>,

    /// Per-request timeout against the API.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Write tracing output to this file. Logging is off otherwise.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Run against built-in sample data instead of a server.
    #[arg(long)]
    pub demo: bool,
}

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api: Option<String>,
    pub start: Option<String>,
    pub poll_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub demo: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings for one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashConfig {
    pub api: Url,
    pub start: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
    pub demo: bool,
}

impl DashConfig {
    /// Reads the file named by `--config`, if any, and resolves.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self, ConfigError> {
        let api = args
            .api
            .clone()
            .or(file.api)
            .unwrap_or_else(|| DEFAULT_API.to_string());
        let start = args
            .start
            .clone()
            .or(file.start)
            .unwrap_or_else(|| DEFAULT_START.to_string());
        let poll_ms = args.poll_ms.or(file.poll_ms).unwrap_or(DEFAULT_POLL_MS);
        let timeout_ms = args
            .timeout_ms
            .or(file.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Ok(Self {
            api: parse_api_url(&api)?,
            start,
            poll_interval: Duration::from_millis(poll_ms.max(1)),
            request_timeout: Duration::from_millis(timeout_ms.max(1)),
            log_file: args.log_file.clone().or(file.log_file),
            demo: args.demo || file.demo.unwrap_or(false),
        })
    }
}

/// Accepts absolute `http`/`https` URLs only.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let config = DashConfig::resolve(&Args::default(), FileConfig::default()).unwrap();
        assert_eq!(config.api.as_str(), "http://127.0.0.1:6007/");
        assert_eq!(config.poll_interval, Duration::from_millis(16));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.start, "/");
        assert!(config.log_file.is_none());
        assert!(!config.demo);
    }

    #[test]
    fn file_values_fill_in_and_flags_win() {
        let file = write_config(indoc! {r#"
            api = "http://10.0.0.2:6007"
            start = "/logs"
            poll_ms = 40
            demo = true
        "#});
        let args = Args {
            config: Some(file.path().to_path_buf()),
            start: Some("/sites".into()),
            ..Args::default()
        };
        let config = DashConfig::load(&args).unwrap();
        assert_eq!(config.api.host_str(), Some("10.0.0.2"));
        assert_eq!(config.start, "/sites");
        assert_eq!(config.poll_interval, Duration::from_millis(40));
        assert!(config.demo);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("colour = \"blue\"\n");
        let args = Args {
            config: Some(file.path().to_path_buf()),
            ..Args::default()
        };
        assert!(matches!(
            DashConfig::load(&args),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let args = Args {
            config: Some(path.clone()),
            ..Args::default()
        };
        match DashConfig::load(&args) {
            Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn api_url_must_be_absolute_http() {
        assert!(parse_api_url("https://dash.example.com/api").is_ok());
        assert!(matches!(
            parse_api_url("localhost:6007"),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            parse_api_url("ftp://example.com"),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(parse_api_url("/relative").is_err());
    }

    #[test]
    fn args_parse_from_command_line() {
        let args = Args::try_parse_from([
            "goup-dash",
            "--api",
            "http://example.com:6007",
            "--poll-ms",
            "25",
            "--demo",
        ])
        .unwrap();
        assert_eq!(args.api.as_deref(), Some("http://example.com:6007"));
        assert_eq!(args.poll_ms, Some(25));
        assert!(args.demo);
    }
}
