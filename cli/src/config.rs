// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::Path, path::PathBuf};

use duesync_core::{APP_NAME, Config, env};
use tokio::fs;

const DUESYNC_CONFIG_ENV: &str = "DUESYNC_CONFIG";

/// Setting any of these selects the environment as the configuration source.
const CONNECTION_VARS: &[&str] = &[
    env::WEBDAV_URL,
    env::WEBDAV_USERNAME,
    env::WEBDAV_PASSWORD,
    env::CALDAV_URL,
    env::CALDAV_USERNAME,
    env::CALDAV_PASSWORD,
    env::CALENDAR_NAME,
];

/// Loads the configuration from the process environment and config files.
///
/// The first source found wins: `--config`, `$DUESYNC_CONFIG`, the connection
/// variables, then `$XDG_CONFIG_HOME/duesync/config.toml`. Without any of them
/// the connection variables are reported as missing.
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    parse_config_with(path, |key| std::env::var(key).ok()).await
}

#[tracing::instrument(skip(lookup))]
async fn parse_config_with(
    path: Option<PathBuf>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, Box<dyn Error>> {
    let is_set = |key: &str| lookup(key).filter(|v| !v.is_empty());

    let path = if let Some(path) = path {
        Some(path)
    } else if let Some(env_path) = is_set(DUESYNC_CONFIG_ENV) {
        Some(PathBuf::from(env_path))
    } else if CONNECTION_VARS.iter().any(|key| is_set(key).is_some()) {
        None
    } else {
        default_config_path().filter(|path| path.exists())
    };

    let config = match path {
        Some(path) => read_config(&path).await?,
        None => {
            tracing::debug!("reading configuration from environment variables");
            Config::from_vars(&lookup)?
        }
    };
    Ok(config)
}

async fn read_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    tracing::debug!(path = %path.display(), "reading configuration file");
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse config file at {}: {}", path.display(), e))?;
    config.validate()?;
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();

    if config_dir.is_none() {
        tracing::warn!("user-specific config directory not found");
    }
    config_dir.map(|dir| dir.join(APP_NAME).join("config.toml"))
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::sync::OnceLock;

    use duesync_core::WriteBackendKind;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    use super::*;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn config_toml(source_url: &str) -> String {
        format!(
            r#"
write_backend = "raw"

[source]
url = "{source_url}"
username = "sp"
password = "sp-secret"

[calendar]
url = "https://cloud.example.com/remote.php/dav/calendars/me/tasks/"
username = "me"
password = "secret"
"#
        )
    }

    fn write_config(dir: &TempDir, name: &str, source_url: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, config_toml(source_url)).unwrap();
        path
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn connection_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (env::WEBDAV_URL, "https://dav.example.com/env/"),
            (env::WEBDAV_USERNAME, "sp"),
            (env::WEBDAV_PASSWORD, "sp-secret"),
            (env::CALDAV_URL, "https://cloud.example.com/dav/"),
            (env::CALDAV_USERNAME, "me"),
            (env::CALDAV_PASSWORD, "secret"),
            (env::CALENDAR_NAME, "Tasks"),
        ]
    }

    #[tokio::test]
    async fn cli_flag_overrides_env_var() {
        let dir = TempDir::new().unwrap();
        let cli_path = write_config(&dir, "cli.toml", "https://dav.example.com/cli/");
        let env_path = write_config(&dir, "env.toml", "https://dav.example.com/env/");

        let lookup = vars(&[(DUESYNC_CONFIG_ENV, env_path.to_str().unwrap())]);
        let config = parse_config_with(Some(cli_path), lookup).await.unwrap();

        assert_eq!(config.source.url, "https://dav.example.com/cli/");
        assert_eq!(config.write_backend, WriteBackendKind::Raw);
    }

    #[tokio::test]
    async fn config_env_var_overrides_connection_vars() {
        let dir = TempDir::new().unwrap();
        let env_path = write_config(&dir, "env.toml", "https://dav.example.com/file/");

        let mut pairs = connection_vars();
        pairs.push((DUESYNC_CONFIG_ENV, env_path.to_str().unwrap()));
        let config = parse_config_with(None, vars(&pairs)).await.unwrap();

        assert_eq!(config.source.url, "https://dav.example.com/file/");
    }

    #[tokio::test]
    async fn connection_vars_build_config() {
        let config = parse_config_with(None, vars(&connection_vars()))
            .await
            .unwrap();

        assert_eq!(config.source.url, "https://dav.example.com/env/");
        assert_eq!(config.calendar.name.as_deref(), Some("Tasks"));
        assert_eq!(config.write_backend, WriteBackendKind::Auto);
    }

    #[tokio::test]
    async fn partial_connection_vars_report_all_missing() {
        let lookup = vars(&[(env::WEBDAV_URL, "https://dav.example.com/sp/")]);
        let err = parse_config_with(None, lookup).await.unwrap_err();

        let msg = err.to_string();
        for key in &CONNECTION_VARS[1..] {
            assert!(msg.contains(key), "{key} not in {msg}");
        }
        assert!(!msg.contains("WEBDAV_URL,"));
    }

    #[tokio::test]
    async fn config_file_missing_keys_are_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[source]\nurl = \"https://dav.example.com/sp/\"\n").unwrap();

        let err = parse_config_with(Some(path), vars(&[])).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("source.username"));
        assert!(msg.contains("calendar.password"));
    }

    #[tokio::test]
    async fn unreadable_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        let err = parse_config_with(Some(path), vars(&[])).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn uses_default_when_no_cli_or_env() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(APP_NAME)).unwrap();
        write_config(&dir, "duesync/config.toml", "https://dav.example.com/default/");

        let _guard = env_lock().lock().await;
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        let config = parse_config_with(None, vars(&[])).await;

        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
        assert_eq!(
            config.unwrap().source.url,
            "https://dav.example.com/default/"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reports_connection_vars_when_no_config_found() {
        let dir = TempDir::new().unwrap();

        let _guard = env_lock().lock().await;
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        let result = parse_config_with(None, vars(&[])).await;

        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
        let msg = result.unwrap_err().to_string();
        for key in CONNECTION_VARS {
            assert!(msg.contains(key), "{key} not in {msg}");
        }
    }
}
