/**
Driver configuration

Read from `strata.config.toml` beside the source file, or from the path
given with `--config`. Every key is optional:

```toml
[pipeline]
type_check = true
emit_c = true

[output]
c_dir = "build"

[diagnostics]
verbose = false
timing = true
```

Command-line flags are applied on top with [`Config::apply_flags`].
*/
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "strata.config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("incorrect configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub type_check: bool,
    pub emit_c: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            type_check: true,
            emit_c: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for generated C; beside the source when unset
    pub c_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    pub verbose: bool,
    pub timing: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        DiagnosticsConfig {
            verbose: false,
            timing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Overrides taken from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub no_check: bool,
    pub no_emit: bool,
    pub verbose: bool,
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// An explicit config path must exist; the implicit one beside the
    /// source is optional.
    pub fn load(explicit: Option<&Path>, source: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let implicit = source
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(CONFIG_FILE_NAME);
        if implicit.is_file() {
            Self::from_file(&implicit)
        } else {
            Ok(Config::default())
        }
    }

    pub fn apply_flags(&mut self, flags: Flags) {
        if flags.no_check {
            self.pipeline.type_check = false;
        }
        if flags.no_emit {
            self.pipeline.emit_c = false;
        }
        if flags.verbose {
            self.diagnostics.verbose = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        Config::from_toml(text, Path::new("test.toml"))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.pipeline.type_check);
        assert!(config.pipeline.emit_c);
        assert!(!config.diagnostics.verbose);
        assert!(config.diagnostics.timing);
        assert_eq!(config.output.c_dir, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse("[pipeline]\nemit_c = false\n[output]\nc_dir = \"build\"").unwrap();
        assert!(config.pipeline.type_check);
        assert!(!config.pipeline.emit_c);
        assert_eq!(config.output.c_dir, Some(PathBuf::from("build")));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse("[pipeline]\ntypecheck = false").unwrap_err();
        assert!(err.to_string().starts_with("incorrect configuration in test.toml"));
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = parse("[diagnostics]\nverbose = false").unwrap();
        config.apply_flags(Flags {
            no_check: true,
            no_emit: false,
            verbose: true,
        });
        assert!(!config.pipeline.type_check);
        assert!(config.pipeline.emit_c);
        assert!(config.diagnostics.verbose);
    }

    #[test]
    fn test_load_implicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prog.str");
        assert_eq!(Config::load(None, &source).unwrap(), Config::default());

        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[diagnostics]\ntiming = false",
        )
        .unwrap();
        assert!(!Config::load(None, &source).unwrap().diagnostics.timing);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing), Path::new("prog.str")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
