//! Configuration loading and root folder resolution
//!
//! All mutable state (database file, evidence store) lives under one root
//! folder. Resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `RELEVO_ROOT` environment variable
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default inactivity window before a session is considered expired
pub const DEFAULT_SESSION_TIMEOUT_MINUTES: i64 = 30;

/// Runtime configuration for the API service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root folder holding the database and the evidence store
    pub root_folder: PathBuf,
    /// Bind address for the HTTP server
    pub host: String,
    pub port: u16,
    /// Inactivity window before sessions expire
    pub session_timeout_minutes: i64,
    /// Email-notification endpoint; notifications become a no-op when unset
    pub notify_endpoint: Option<String>,
    pub notify_api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment with compiled defaults
    pub fn from_env(cli_root: Option<&str>) -> Result<Self> {
        let root_folder = resolve_root_folder(cli_root, "RELEVO_ROOT")?;

        let host = std::env::var("RELEVO_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match std::env::var("RELEVO_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid RELEVO_PORT: {}", raw)))?,
            Err(_) => 5180,
        };

        let session_timeout_minutes = match std::env::var("RELEVO_SESSION_TIMEOUT_MINUTES") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                Error::Config(format!("Invalid RELEVO_SESSION_TIMEOUT_MINUTES: {}", raw))
            })?,
            Err(_) => DEFAULT_SESSION_TIMEOUT_MINUTES,
        };

        // Notification settings are optional; missing endpoint degrades to no-op
        let notify_endpoint = std::env::var("RELEVO_NOTIFY_ENDPOINT").ok();
        let notify_api_key = std::env::var("RELEVO_NOTIFY_API_KEY").ok();

        Ok(Self {
            root_folder,
            host,
            port,
            session_timeout_minutes,
            notify_endpoint,
            notify_api_key,
        })
    }

    /// Path of the SQLite database file under the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("relevo.db")
    }

    /// Root of the filesystem object store for evidence files
    pub fn storage_root(&self) -> PathBuf {
        self.root_folder.join("almacen")
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs((self.session_timeout_minutes.max(1) as u64) * 60)
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_root_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }
}

/// Root folder resolution following the priority order above
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Some(root) = read_root_folder_key(&config_path) {
            return Ok(root);
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

fn read_root_folder_key(config_path: &Path) -> Option<PathBuf> {
    let toml_content = std::fs::read_to_string(config_path).ok()?;
    let config = toml::from_str::<toml::Value>(&toml_content).ok()?;
    config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// Get configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/relevo/config.toml first, then /etc/relevo/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("relevo").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/relevo/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("relevo").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("relevo"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\relevo"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("relevo"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/relevo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_argument_wins() {
        let root = resolve_root_folder(Some("/tmp/relevo-test"), "RELEVO_TEST_UNSET").unwrap();
        assert_eq!(root, PathBuf::from("/tmp/relevo-test"));
    }

    #[test]
    fn test_env_var_used_when_no_cli() {
        std::env::set_var("RELEVO_TEST_ROOT_VAR", "/tmp/relevo-env");
        let root = resolve_root_folder(None, "RELEVO_TEST_ROOT_VAR").unwrap();
        assert_eq!(root, PathBuf::from("/tmp/relevo-env"));
        std::env::remove_var("RELEVO_TEST_ROOT_VAR");
    }

    #[test]
    fn test_derived_paths() {
        let config = AppConfig {
            root_folder: PathBuf::from("/data/relevo"),
            host: "127.0.0.1".to_string(),
            port: 5180,
            session_timeout_minutes: 30,
            notify_endpoint: None,
            notify_api_key: None,
        };
        assert_eq!(config.database_path(), PathBuf::from("/data/relevo/relevo.db"));
        assert_eq!(config.storage_root(), PathBuf::from("/data/relevo/almacen"));
        assert_eq!(config.session_timeout(), Duration::from_secs(1800));
    }
}
