use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::handler::resolver::normalize;

/// Server settings, loaded once at startup and shared read-only by every
/// connection handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,

    /// Absolute, lexically normalized document root.
    pub root: PathBuf,

    /// File served for a bare `/` request.
    pub default_page: String,

    /// Number of connections handled concurrently.
    pub max_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            root: normalize(&absolute(Path::new("./www"))),
            default_page: "index.html".to_string(),
            max_threads: 8,
        }
    }
}

/// Values as they appear in the file, before defaults and path resolution.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    address: Option<IpAddr>,
    port: Option<u16>,
    root: Option<String>,
    default_page: Option<String>,
    max_threads: Option<usize>,
}

impl ServerConfig {
    /// Loads a configuration file.
    ///
    /// Files ending in `.toml` are read as TOML; anything else is read as
    /// `key=value` lines (`port=`, `root=`, `defaultPage=`, `maxThreads=`,
    /// `address=`). Keys that are absent keep their default value.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let raw = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str::<RawConfig>(&content)?,
            _ => RawConfig::from_ini(&content)?,
        };

        raw.into_config()
    }

    /// Parses `key=value` text directly.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigError> {
        RawConfig::from_ini(content)?.into_config()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl RawConfig {
    fn from_ini(content: &str) -> Result<Self, ConfigError> {
        let mut raw = RawConfig::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "port" => raw.port = Some(parse_value("port", value)?),
                "address" => raw.address = Some(parse_value("address", value)?),
                "root" => raw.root = Some(value.to_string()),
                "defaultPage" => raw.default_page = Some(value.to_string()),
                "maxThreads" => raw.max_threads = Some(parse_value("maxThreads", value)?),
                _ => {}
            }
        }

        Ok(raw)
    }

    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();

        let max_threads = self.max_threads.unwrap_or(defaults.max_threads);
        if max_threads == 0 {
            return Err(ConfigError::NoWorkers);
        }

        let root = match self.root {
            Some(root) => resolve_root(&root)?,
            None => defaults.root,
        };

        Ok(ServerConfig {
            address: self.address.unwrap_or(defaults.address),
            port: self.port.unwrap_or(defaults.port),
            root,
            default_page: self.default_page.unwrap_or(defaults.default_page),
            max_threads,
        })
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Expands a leading `~`, then makes the path absolute and normalized.
fn resolve_root(root: &str) -> Result<PathBuf, ConfigError> {
    let expanded = match root.strip_prefix('~') {
        Some(rest) => {
            let home = home_dir().ok_or_else(|| ConfigError::InvalidValue {
                key: "root",
                value: root.to_string(),
            })?;
            home.join(rest.trim_start_matches('/'))
        }
        None => PathBuf::from(root),
    };

    if expanded.is_absolute() {
        return Ok(normalize(&expanded));
    }

    let cwd = std::env::current_dir().map_err(|source| ConfigError::Root {
        path: expanded.clone(),
        source,
    })?;
    Ok(normalize(&cwd.join(expanded)))
}

fn absolute(path: &Path) -> PathBuf {
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Home directory of the user running the server.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ini_values_are_read() {
        let config = ServerConfig::from_ini_str(
            "port=9090\nroot=/srv/www\ndefaultPage=home.html\nmaxThreads=3\n",
        )
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.root, PathBuf::from("/srv/www"));
        assert_eq!(config.default_page, "home.html");
        assert_eq!(config.max_threads, 3);
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn ini_skips_comments_and_unknown_keys() {
        let config = ServerConfig::from_ini_str(
            "# comment\n; another\n\nfoo=bar\nnot a pair\n  port = 7000  \n",
        )
        .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.default_page, "index.html");
        assert_eq!(config.max_threads, 8);
    }

    #[test]
    fn ini_rejects_bad_numbers() {
        let err = ServerConfig::from_ini_str("port=eighty\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "port", .. }));

        let err = ServerConfig::from_ini_str("maxThreads=-1\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "maxThreads", .. }));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = ServerConfig::from_ini_str("maxThreads=0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoWorkers));
    }

    #[test]
    fn root_is_normalized() {
        let config = ServerConfig::from_ini_str("root=/srv/./www/../site/\n").unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/site"));
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let config = ServerConfig::from_ini_str("root=public\n").unwrap();
        assert!(config.root.is_absolute());
        assert!(config.root.ends_with("public"));
    }

    #[test]
    fn tilde_root_expands_to_home() {
        let Some(home) = home_dir() else {
            return;
        };
        let config = ServerConfig::from_ini_str("root=~/www\n").unwrap();
        assert_eq!(config.root, normalize(&home.join("www")));
    }

    #[test]
    fn toml_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 8181\naddress = \"127.0.0.1\"\nroot = \"/var/www\"\ndefaultPage = \"main.html\"\nmaxThreads = 2"
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8181);
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.root, PathBuf::from("/var/www"));
        assert_eq!(config.default_page, "main.html");
        assert_eq!(config.max_threads, 2);
    }

    #[test]
    fn ini_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        writeln!(file, "port=8282\nroot=/tmp/site").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8282);
        assert_eq!(config.root, PathBuf::from("/tmp/site"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ServerConfig::from_file(Path::new("/definitely/not/here.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn socket_addr_combines_address_and_port() {
        let config = ServerConfig::from_ini_str("address=127.0.0.1\nport=3000\n").unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }
}
