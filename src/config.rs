//! Classifier configuration.
//!
//! Loaded from `rolemap.yaml` (or one of its aliases) at the project root:
//!
//! ```yaml
//! overrides:
//!   infra: ["deploy/**", "ops/**"]
//!   generated: ["**/*.pb.go"]
//! options:
//!   header_probe: true
//!   neighborhood: true
//! ```
//!
//! Override roles are tried in the order they appear in the file.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::inference::EngineOptions;
use crate::model::Role;

/// Config file names probed by `Config::load_from_dir`, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "rolemap.yaml",
    "rolemap.yml",
    ".rolemap.yaml",
    ".rolemap.yml",
    ".rolemaprc.json",
];

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Role → glob patterns, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideRules(Vec<(Role, Vec<String>)>);

impl OverrideRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append patterns for `role`. Repeated roles extend their existing entry.
    pub fn push<I, S>(&mut self, role: Role, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns.into_iter().map(Into::<String>::into);
        match self.0.iter_mut().find(|(r, _)| *r == role) {
            Some((_, existing)) => existing.extend(patterns),
            None => self.0.push((role, patterns.collect())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Role, Vec<String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, p)| p.is_empty())
    }

    pub fn patterns(&self, role: Role) -> &[String] {
        self.0
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, p)| p.as_slice())
            .unwrap_or(&[])
    }
}

impl FromIterator<(Role, Vec<String>)> for OverrideRules {
    fn from_iter<T: IntoIterator<Item = (Role, Vec<String>)>>(iter: T) -> Self {
        let mut rules = OverrideRules::new();
        for (role, patterns) in iter {
            rules.push(role, patterns);
        }
        rules
    }
}

impl Serialize for OverrideRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (role, patterns) in &self.0 {
            map.serialize_entry(role, patterns)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OverrideRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OverrideRules;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of role to glob patterns")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(OverrideRules::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut rules = OverrideRules::new();
                while let Some((role, patterns)) = access.next_entry::<Role, Vec<String>>()? {
                    rules.push(role, patterns);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_any(OrderedVisitor)
    }
}

/// Behaviour toggles for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Options {
    /// Read the first bytes of undecided files looking for banners.
    #[serde(default)]
    pub header_probe: bool,
    /// Let confident directory neighbours correct weak verdicts.
    #[serde(default = "default_true")]
    pub neighborhood: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            header_probe: false,
            neighborhood: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub overrides: OverrideRules,
    #[serde(default)]
    pub options: Options,
}

impl Config {
    /// Parse YAML config text. An empty document yields the defaults.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a config file. `.json` files are read as JSON, anything else
    /// as YAML.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            serde_json::from_str(&content)?
        } else {
            Self::parse_str(&content)?
        };
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the first config file found in `dir`, or the defaults if none
    /// exists.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::parse_file(&candidate);
            }
        }
        debug!("No config file in {}, using defaults", dir.display());
        Ok(Config::default())
    }

    /// Engine settings described by this config.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            header_probe: self.options.header_probe,
            neighborhood: self.options.neighborhood,
            overrides: self.overrides.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.overrides.is_empty());
        assert!(!config.options.header_probe);
        assert!(config.options.neighborhood);
    }

    #[test]
    fn test_parse_preserves_declaration_order() {
        let config = Config::parse_str(
            r#"
overrides:
  test: ["ops/**"]
  infra: ["ops/**", "deploy/**"]
options:
  header_probe: true
"#,
        )
        .unwrap();

        let roles: Vec<Role> = config.overrides.iter().map(|(r, _)| *r).collect();
        assert_eq!(roles, vec![Role::Test, Role::Infra]);
        assert_eq!(config.overrides.patterns(Role::Infra), &["ops/**", "deploy/**"]);
        assert!(config.options.header_probe);
        assert!(config.options.neighborhood);
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(Config::parse_str("").unwrap(), Config::default());
        assert_eq!(Config::parse_str("overrides:\n").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let err = Config::parse_str("overrides:\n  product: [\"src/**\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_malformed_glob_is_not_an_error() {
        let config = Config::parse_str("overrides:\n  docs: [\"[oops\"]\n").unwrap();
        assert_eq!(config.overrides.patterns(Role::Docs), &["[oops"]);
    }

    #[test]
    fn test_push_merges_repeated_role() {
        let mut rules = OverrideRules::new();
        rules.push(Role::Infra, ["a/**"]);
        rules.push(Role::Test, ["t/**"]);
        rules.push(Role::Infra, ["b/**"]);

        assert_eq!(rules.iter().count(), 2);
        assert_eq!(rules.patterns(Role::Infra), &["a/**", "b/**"]);
    }

    #[test]
    fn test_load_from_dir_without_config() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from_dir(temp.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_dir_prefers_first_candidate() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".rolemap.yml"),
            "options:\n  neighborhood: false\n",
        )
        .unwrap();
        std::fs::write(
            temp.path().join("rolemap.yaml"),
            "options:\n  header_probe: true\n",
        )
        .unwrap();

        let config = Config::load_from_dir(temp.path()).unwrap();
        assert!(config.options.header_probe);
        assert!(config.options.neighborhood);
    }

    #[test]
    fn test_load_json_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".rolemaprc.json"),
            r#"{"overrides": {"vendor": ["third/**"]}, "options": {"header_probe": true}}"#,
        )
        .unwrap();

        let config = Config::load_from_dir(temp.path()).unwrap();
        assert_eq!(config.overrides.patterns(Role::Vendor), &["third/**"]);
        assert!(config.options.header_probe);
    }

    #[test]
    fn test_parse_file_missing() {
        let temp = TempDir::new().unwrap();
        let err = Config::parse_file(temp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_engine_options() {
        let config = Config::parse_str(
            "overrides:\n  infra: [\"ops/**\"]\noptions:\n  header_probe: true\n  neighborhood: false\n",
        )
        .unwrap();
        let opts = config.engine_options();
        assert!(opts.header_probe);
        assert!(!opts.neighborhood);
        assert_eq!(opts.overrides.patterns(Role::Infra), &["ops/**"]);
    }
}
