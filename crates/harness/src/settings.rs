//! Credential settings - optional TOML file with environment override
//!
//! Live sandbox-API suites need a personal access token. It is read from
//! `config/settings.toml` (relative to the working directory, absent in a
//! fresh checkout) and can always be overridden by the `ACCESS_TOKEN`
//! environment variable. Hermetic suites never consult this.

use serde::Deserialize;

use crate::error::{HarnessError, HarnessResult};

pub const SETTINGS_PATH: &str = "config/settings.toml";
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bearer token for the user-management sandbox API
    pub access_token: Option<String>,
}

impl Settings {
    /// Read the settings file when present and apply the environment
    /// override. A missing file or variable is not an error; a file that
    /// exists but does not parse is.
    pub fn load() -> HarnessResult<Self> {
        let file = match std::fs::read_to_string(SETTINGS_PATH) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Self::from_sources(file.as_deref(), std::env::var(ENV_ACCESS_TOKEN).ok())
    }

    /// Merge the two sources; the environment wins. Empty tokens count
    /// as absent.
    pub fn from_sources(file: Option<&str>, env_token: Option<String>) -> HarnessResult<Self> {
        let mut settings = match file {
            Some(contents) => toml::from_str::<Settings>(contents).map_err(|e| {
                HarnessError::Settings(format!("cannot parse {SETTINGS_PATH}: {e}"))
            })?,
            None => Settings::default(),
        };
        if let Some(token) = env_token {
            if !token.is_empty() {
                settings.access_token = Some(token);
            }
        }
        settings.access_token = settings.access_token.filter(|t| !t.is_empty());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_token() {
        let settings = Settings::from_sources(None, None).expect("empty sources");
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn reads_token_from_file() {
        let settings = Settings::from_sources(Some("access_token = \"abc123\"\n"), None)
            .expect("parse file");
        assert_eq!(settings.access_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn environment_wins_over_file() {
        let settings = Settings::from_sources(
            Some("access_token = \"from-file\"\n"),
            Some("from-env".to_string()),
        )
        .expect("merge sources");
        assert_eq!(settings.access_token.as_deref(), Some("from-env"));
    }

    #[test]
    fn empty_tokens_count_as_absent() {
        let settings =
            Settings::from_sources(Some("access_token = \"\"\n"), Some(String::new()))
                .expect("merge sources");
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = Settings::from_sources(Some("access_token = [broken\n"), None)
            .expect_err("parse should fail");
        assert!(err.to_string().contains("cannot parse"));
    }
}
