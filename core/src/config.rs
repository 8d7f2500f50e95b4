use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::error::WebtermErr;
use crate::exec::DEFAULT_EXEC_TIMEOUT;
use crate::project::ProjectsRoot;

pub const CONFIG_TOML_FILE: &str = "config.toml";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const WEBTERM_HOME_ENV_VAR: &str = "WEBTERM_HOME";
const DEFAULT_PROJECTS_DIR: &str = "projects";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `config.toml` and logs.
    pub webterm_home: PathBuf,
    pub projects_root: ProjectsRoot,
    pub listen_addr: SocketAddr,
    /// Server-wide execution deadline. Requests cannot change it.
    pub exec_timeout: Duration,
}

/// On-disk shape of `$WEBTERM_HOME/config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    pub projects_root: Option<PathBuf>,
    pub listen_addr: Option<String>,
    pub exec_timeout_ms: Option<u64>,
}

/// Values supplied on the command line; they win over `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub projects_root: Option<PathBuf>,
    pub listen_addr: Option<SocketAddr>,
    pub exec_timeout_ms: Option<u64>,
}

impl Config {
    /// Loads `config.toml` from the webterm home (if present) and layers the
    /// CLI overrides on top.
    pub fn load_with_cli_overrides(overrides: ConfigOverrides) -> Result<Self> {
        let webterm_home = find_webterm_home()?;
        let cfg = load_config_as_toml(&webterm_home)?;
        Self::load_from_base_config_with_overrides(cfg, overrides, webterm_home)
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        webterm_home: PathBuf,
    ) -> Result<Self> {
        let ConfigOverrides {
            projects_root,
            listen_addr,
            exec_timeout_ms,
        } = overrides;

        let projects_root = match projects_root.or(cfg.projects_root) {
            Some(root) => root,
            None => default_projects_root()?,
        };

        let listen_addr = match listen_addr {
            Some(addr) => addr,
            None => {
                let value = cfg
                    .listen_addr
                    .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
                value
                    .parse()
                    .map_err(|source| WebtermErr::InvalidListenAddr { value, source })?
            }
        };

        let exec_timeout = exec_timeout_ms
            .or(cfg.exec_timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_EXEC_TIMEOUT);

        Ok(Self {
            webterm_home,
            projects_root: ProjectsRoot::new(projects_root),
            listen_addr,
            exec_timeout,
        })
    }
}

/// Where the interactive client writes its log file.
pub fn log_dir(webterm_home: &Path) -> PathBuf {
    webterm_home.join("log")
}

/// Reads `config.toml` under `webterm_home`. A missing file yields the
/// defaults; an unreadable or malformed one is an error.
pub fn load_config_as_toml(webterm_home: &Path) -> Result<ConfigToml> {
    let path = webterm_home.join(CONFIG_TOML_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ConfigToml::default());
        }
        Err(err) => return Err(WebtermErr::config_read(path, err)),
    };
    toml::from_str(&contents).map_err(|err| WebtermErr::config_parse(path, err))
}

/// `$WEBTERM_HOME` when set and non-empty, otherwise `~/.webterm`. The
/// directory is not required to exist.
pub fn find_webterm_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(WEBTERM_HOME_ENV_VAR)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }
    let mut home = dirs::home_dir().ok_or(WebtermErr::HomeDirNotFound)?;
    home.push(".webterm");
    Ok(home)
}

fn default_projects_root() -> Result<PathBuf> {
    let mut root = dirs::home_dir().ok_or(WebtermErr::HomeDirNotFound)?;
    root.push(DEFAULT_PROJECTS_DIR);
    Ok(root)
}
