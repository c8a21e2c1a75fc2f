//! Layered configuration for renamr.
//!
//! Values are resolved from, in increasing priority:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A configuration file (TOML, YAML or JSON, chosen by extension)
//! 3. `RENAMR_`-prefixed environment variables, with `__` separating the
//!    section from the key (e.g. `RENAMR_ARCHIVE__BATCH_SIZE=3`)

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use renamr_archive::Compression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "RENAMR_";
const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub intake: IntakeConfig,
    pub naming: NamingConfig,
    pub archive: ArchiveConfig,
    pub ledger: LedgerConfig,
}

/// Limits applied when files are added to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Maximum number of records a session may hold.
    pub max_files: usize,
    /// Largest admitted file, in bytes (inclusive).
    pub max_file_size: u64,
    /// Files larger than this get a progress ticker while they load.
    pub progress_threshold: u64,
}
impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_files: 20,
            max_file_size: 100 * MIB,
            progress_threshold: MIB,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Template for the new file stem; `base` and `index` (1-based) are
    /// available. The original extension is appended afterwards.
    pub template: String,
}
impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            template: "{{ base }}_{{ index }}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Number of files read concurrently while collecting archive entries.
    pub batch_size: usize,
    pub compression: Compression,
}
impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            compression: Compression::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Where `history.json` and `analytics.json` live. Defaults to the
    /// platform data directory.
    pub directory: Option<PathBuf>,
    pub history_limit: usize,
}
impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            directory: None,
            history_limit: 50,
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "renamr").ok_or_else(|| exn::Exn::from(ErrorKind::NoHomeDirectory))
}

impl Config {
    /// Default configuration file location, e.g. `~/.config/renamr/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Build the layered [`Figment`] without extracting it.
    ///
    /// An explicit `path` must exist; without one, the default location is
    /// used if a file is present there.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().ok().filter(|path| path.is_file()),
        };
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Loading configuration file");
            let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(&file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(&file)),
                Some("json") => figment.merge(Json::file(&file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(path)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.intake.max_files == 0, "intake.max_files must be at least 1"),
            (self.intake.max_file_size == 0, "intake.max_file_size must be at least 1"),
            (self.archive.batch_size == 0, "archive.batch_size must be at least 1"),
            (self.ledger.history_limit == 0, "ledger.history_limit must be at least 1"),
            (self.naming.template.trim().is_empty(), "naming.template must not be empty"),
        ];
        if let Some((_, message)) = checks.into_iter().find(|(failed, _)| *failed) {
            exn::bail!(ErrorKind::Invalid(message.to_string()));
        }
        Ok(())
    }

    /// Resolved ledger directory.
    pub fn ledger_directory(&self) -> Result<PathBuf> {
        match &self.ledger.directory {
            Some(directory) => Ok(directory.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.intake.max_files, 20);
        assert_eq!(config.intake.max_file_size, 104_857_600);
        assert_eq!(config.intake.progress_threshold, 1_048_576);
        assert_eq!(config.archive.batch_size, 5);
        assert_eq!(config.archive.compression, Compression::Deflate);
        assert_eq!(config.ledger.history_limit, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "renamr.toml",
                r#"
                [intake]
                max_files = 10

                [archive]
                batch_size = 2
                compression = "stored"
                "#,
            )?;
            jail.set_env("RENAMR_ARCHIVE__BATCH_SIZE", "3");
            jail.set_env("RENAMR_LEDGER__DIRECTORY", "/tmp/renamr-ledger");

            let config = Config::load(Some(Path::new("renamr.toml"))).unwrap();
            assert_eq!(config.intake.max_files, 10);
            assert_eq!(config.intake.max_file_size, 100 * MIB);
            assert_eq!(config.archive.batch_size, 3);
            assert_eq!(config.archive.compression, Compression::Stored);
            assert_eq!(config.ledger_directory().unwrap(), PathBuf::from("/tmp/renamr-ledger"));
            Ok(())
        });
    }

    #[test]
    fn test_yaml_and_json_files() {
        Jail::expect_with(|jail| {
            jail.create_file("renamr.yaml", "naming:\n  template: \"{{ index }}-{{ base }}\"\n")?;
            jail.create_file("renamr.json", r#"{"ledger": {"history_limit": 10}}"#)?;
            let yaml = Config::load(Some(Path::new("renamr.yaml"))).unwrap();
            assert_eq!(yaml.naming.template, "{{ index }}-{{ base }}");
            let json = Config::load(Some(Path::new("renamr.json"))).unwrap();
            assert_eq!(json.ledger.history_limit, 10);
            Ok(())
        });
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        Jail::expect_with(|jail| {
            let err = Config::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            jail.create_file("renamr.ini", "max_files = 3")?;
            let err = Config::load(Some(Path::new("renamr.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[test]
    fn test_bad_values_fail_to_load() {
        Jail::expect_with(|jail| {
            jail.create_file("renamr.toml", "[archive]\ncompression = \"lzma\"\n")?;
            let err = Config::load(Some(Path::new("renamr.toml"))).unwrap_err();
            assert_eq!(*err, ErrorKind::Load);
            Ok(())
        });
    }

    #[rstest]
    #[case::no_files(|c: &mut Config| c.intake.max_files = 0)]
    #[case::no_size(|c: &mut Config| c.intake.max_file_size = 0)]
    #[case::no_batch(|c: &mut Config| c.archive.batch_size = 0)]
    #[case::no_history(|c: &mut Config| c.ledger.history_limit = 0)]
    #[case::blank_template(|c: &mut Config| c.naming.template = "  ".to_string())]
    fn test_validate_rejects(#[case] tweak: fn(&mut Config)) {
        let mut config = Config::default();
        tweak(&mut config);
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }
}
