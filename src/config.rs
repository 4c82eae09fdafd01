//! Configuration document consumed by the tap.
//!
//! The types in this module mirror the structure of the YAML documents
//! supplied by operators. Identifier sequences default to empty so that the
//! parameterized streams degrade to zero requests, and aliases keep older
//! key spellings working.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Base URL of the Fantasy Premier League API used when no override is
/// configured.
pub const DEFAULT_API_URL: &str = "https://fantasy.premierleague.com/api";

/// Root configuration document for a tap run.
///
/// # Examples
///
/// ```
/// use tap_fpl::TapConfig;
///
/// let yaml = r#"
/// managers: [101, 102]
/// gameweeks: [1, 2, 3]
/// "#;
/// let config: TapConfig = serde_yaml::from_str(yaml).expect("valid configuration");
/// assert_eq!(config.managers.len(), 2);
/// assert!(config.players.is_empty());
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TapConfig {
    /// Base URL for all resolved request paths.
    #[serde(default = "default_api_url", alias = "base_url")]
    pub api_url: String,

    /// Manager identifiers iterated by the selections stream (inner loop).
    #[serde(default)]
    pub managers: Vec<u64>,

    /// Gameweek numbers iterated by the selections stream (outer loop).
    #[serde(default)]
    pub gameweeks: Vec<u64>,

    /// Player identifiers iterated by the player-details stream.
    #[serde(default)]
    pub players: Vec<u64>,

    /// Classic league identifier required by the standings stream.
    #[serde(default)]
    pub league_id: Option<u64>,

    /// Optional selector restricting discovery and sync to a single stream.
    #[serde(default, alias = "_stream")]
    pub stream: Option<String>,

    /// Optional User-Agent override for outbound requests.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Optional authentication material merged into every request.
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

/// Authentication material applied by the request builder.
///
/// The Fantasy Premier League API requires none of this for public
/// endpoints; the maps stay empty unless an operator supplies values.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AuthConfig {
    /// Headers merged into the base request headers (auth values win).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Query parameters appended to every request.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            managers: Vec::new(),
            gameweeks: Vec::new(),
            players: Vec::new(),
            league_id: None,
            stream: None,
            user_agent: None,
            auth: None,
        }
    }
}

impl TapConfig {
    /// Returns the identifier sequence configured under the given key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the key does not name an identifier
    /// sequence. The key set is fixed by the stream table, so this only
    /// fires on a definition mistake.
    pub fn identifier_values(&self, key: &str) -> Result<&[u64], Error> {
        match key {
            "managers" => Ok(&self.managers),
            "gameweeks" => Ok(&self.gameweeks),
            "players" => Ok(&self.players),
            other => Err(Error::config(format!(
                "'{other}' is not an identifier sequence"
            ))),
        }
    }

    /// Returns the scalar configuration value stored under the given key.
    pub fn static_value(&self, key: &str) -> Option<u64> {
        match key {
            "league_id" => self.league_id,
            _ => None,
        }
    }

    /// Verifies that every named configuration key has a value.
    ///
    /// Called before any request is attempted for a stream; a missing key is
    /// fatal for that stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing key.
    pub fn require(&self, keys: &[&str]) -> Result<(), Error> {
        for key in keys {
            if self.static_value(key).is_none() {
                return Err(Error::config(format!(
                    "required configuration key '{key}' is not set"
                )));
            }
        }
        Ok(())
    }
}

/// Loads the tap configuration from the provided YAML file path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read or the YAML cannot be
/// deserialized.
pub fn load_config(path: &Path) -> Result<TapConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_config(&contents)
}

/// Parses the tap configuration from the provided YAML document string.
///
/// Suitable for unit tests and higher-level callers that already obtained
/// the configuration contents.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML cannot be
/// decoded.
pub fn parse_config(contents: &str) -> Result<TapConfig, Error> {
    let config: TapConfig = serde_yaml::from_str(contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{load_config, parse_config, TapConfig, DEFAULT_API_URL};
    use crate::error::Error;

    #[test]
    fn parse_config_applies_defaults() {
        let config = parse_config("{}").expect("empty document should parse");

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.managers.is_empty());
        assert!(config.gameweeks.is_empty());
        assert!(config.players.is_empty());
        assert!(config.league_id.is_none());
        assert!(config.stream.is_none());
        assert!(config.auth.is_none());
    }

    #[test]
    fn parse_config_reads_identifier_sequences() {
        let yaml = r"
managers: [101, 102]
gameweeks: [1, 2]
players: [7]
league_id: 314
";
        let config = parse_config(yaml).expect("valid configuration");

        assert_eq!(config.managers, vec![101, 102]);
        assert_eq!(config.gameweeks, vec![1, 2]);
        assert_eq!(config.players, vec![7]);
        assert_eq!(config.league_id, Some(314));
    }

    #[test]
    fn parse_config_accepts_legacy_stream_alias() {
        let config = parse_config("_stream: selections").expect("valid configuration");
        assert_eq!(config.stream.as_deref(), Some("selections"));
    }

    #[test]
    fn parse_config_reads_auth_material() {
        let yaml = r#"
auth:
  headers:
    Authorization: "Bearer token"
  params:
    api_key: "secret"
"#;
        let config = parse_config(yaml).expect("valid configuration");
        let auth = config.auth.expect("expected auth section");

        assert_eq!(
            auth.headers.get("Authorization").map(String::as_str),
            Some("Bearer token")
        );
        assert_eq!(auth.params.get("api_key").map(String::as_str), Some("secret"));
    }

    #[test]
    fn parse_config_rejects_invalid_yaml() {
        let error = parse_config("managers: [not-a-number]").unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn load_config_reads_file() {
        let temp = tempdir().expect("failed to create tempdir");
        let config_path = temp.path().join("config.yaml");
        fs::write(&config_path, "gameweeks: [4]\n").expect("failed to write config");

        let config = load_config(&config_path).expect("load failed");
        assert_eq!(config.gameweeks, vec![4]);
    }

    #[test]
    fn load_config_returns_error_for_missing_file() {
        let temp = tempdir().expect("failed to create tempdir");
        let config_path = temp.path().join("nonexistent.yaml");

        let result = load_config(&config_path);
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn identifier_values_maps_known_keys() {
        let config = TapConfig {
            managers: vec![1],
            gameweeks: vec![2, 3],
            players: vec![4],
            ..TapConfig::default()
        };

        assert_eq!(config.identifier_values("managers").expect("managers"), &[1]);
        assert_eq!(
            config.identifier_values("gameweeks").expect("gameweeks"),
            &[2, 3]
        );
        assert_eq!(config.identifier_values("players").expect("players"), &[4]);
    }

    #[test]
    fn identifier_values_rejects_unknown_key() {
        let config = TapConfig::default();
        let error = config.identifier_values("leagues").unwrap_err();
        assert!(matches!(error, Error::Config { .. }));
    }

    #[test]
    fn require_reports_missing_league_id() {
        let config = TapConfig::default();
        let error = config.require(&["league_id"]).unwrap_err();

        match error {
            Error::Config { message } => {
                assert!(message.contains("league_id"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn require_passes_when_value_present() {
        let config = TapConfig {
            league_id: Some(314),
            ..TapConfig::default()
        };

        config.require(&["league_id"]).expect("league_id is set");
    }
}
