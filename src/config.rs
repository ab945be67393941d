//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/docfilter/docfilter.toml`
//! 3. Project config: `--config <file>`, or `./docfilter.toml` if present
//! 4. Environment variables: `DOCFILTER_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::registry::{ProcessorSpec, RendererSpec};
use crate::application::{ApplicationError, FilterConfig, MkDocsConfig};

/// File name of the project-local config.
pub const LOCAL_CONFIG_FILE: &str = "docfilter.toml";

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub processors: Option<Vec<ProcessorSpec>>,
    pub renderer: Option<RendererSpec>,
}

/// Unified configuration for docfilter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Processors applied to every tree, in order
    pub processors: Vec<ProcessorSpec>,
    /// Renderer receiving the surviving modules
    pub renderer: RendererSpec,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            processors: vec![ProcessorSpec::default()],
            renderer: RendererSpec::default(),
        }
    }
}

/// Get the XDG config directory for docfilter.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "docfilter").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("docfilter.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Overlay wins wherever it specifies a section; sections replace wholesale.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            processors: overlay
                .processors
                .clone()
                .unwrap_or_else(|| self.processors.clone()),
            renderer: overlay
                .renderer
                .clone()
                .unwrap_or_else(|| self.renderer.clone()),
        }
    }

    /// Parse settings from TOML text on top of the compiled defaults.
    pub fn from_toml(content: &str) -> Result<Self, ApplicationError> {
        let raw = parse_raw_settings(content).map_err(|e| ApplicationError::Config {
            message: format!("parse config: {e}"),
        })?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_config` - Explicit project config; must exist when given.
    ///   Without it, `./docfilter.toml` is used if present.
    pub fn load(project_config: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Project config
        match project_config {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let local_path = Path::new(LOCAL_CONFIG_FILE);
                if local_path.exists() {
                    current = current.merge_with(&load_raw_settings(local_path)?);
                }
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Apply DOCFILTER_* environment variables as explicit overrides.
    ///
    /// `DOCFILTER_FILTER__*` values patch the first filter processor (one is
    /// appended if none is configured); `DOCFILTER_OUTPUT_DIRECTORY` patches
    /// the renderer.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DOCFILTER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;
        Self::apply_overrides(settings, &config)
    }

    fn apply_overrides(mut settings: Self, config: &Config) -> Result<Self, ApplicationError> {
        let expression = config.get_string("filter.expression").ok();
        let documented_only = get_bool(config, "filter.documented_only")?;
        let exclude_private = get_bool(config, "filter.exclude_private")?;
        let exclude_special = get_bool(config, "filter.exclude_special")?;

        let touches_filter = expression.is_some()
            || documented_only.is_some()
            || exclude_private.is_some()
            || exclude_special.is_some();
        if touches_filter {
            let filter = settings.first_filter_mut();
            if let Some(val) = expression {
                filter.expression = Some(val);
            }
            if let Some(val) = documented_only {
                filter.documented_only = val;
            }
            if let Some(val) = exclude_private {
                filter.exclude_private = val;
            }
            if let Some(val) = exclude_special {
                filter.exclude_special = val;
            }
        }

        if let Ok(val) = config.get_string("output_directory") {
            match &mut settings.renderer {
                RendererSpec::Mkdocs(mkdocs) => mkdocs.output_directory = PathBuf::from(val),
            }
        }

        Ok(settings)
    }

    /// First configured filter processor, appending a default one if missing.
    pub fn first_filter_mut(&mut self) -> &mut FilterConfig {
        let position = self
            .processors
            .iter()
            .position(|p| matches!(p, ProcessorSpec::Filter(_)));
        let index = match position {
            Some(index) => index,
            None => {
                self.processors
                    .push(ProcessorSpec::Filter(FilterConfig::default()));
                self.processors.len() - 1
            }
        };
        match &mut self.processors[index] {
            ProcessorSpec::Filter(filter) => filter,
        }
    }

    /// Output directory of the configured renderer.
    pub fn output_directory(&self) -> &Path {
        match &self.renderer {
            RendererSpec::Mkdocs(MkDocsConfig { output_directory }) => output_directory,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# docfilter configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/docfilter/docfilter.toml
#   Project: ./docfilter.toml, or the file given with --config
#   Env:     DOCFILTER_* environment variables (explicit overrides)
#
# A layer that specifies `processors` or `renderer` replaces that section.

# Processors run in order over every module tree.
[[processors]]
type = "filter"

# Predicate evaluated per member with `name`, `node` and `default` in scope.
# A falsy result removes the member. The default check below still applies,
# so a `True` expression does not keep `_private` members.
# expression = "not name.startswith('_') and default()"

# Drop members without a docstring
# documented_only = false

# Drop `_private` members (names ending in `_` are kept)
# exclude_private = true

# Drop __path__, __annotations__, __name__ and __all__
# exclude_special = true

[renderer]
type = "mkdocs"
# One page per module: <output_directory>/<module>.md
output_directory = "docs"
"#
        .to_string()
    }
}

fn get_bool(config: &Config, key: &str) -> Result<Option<bool>, ApplicationError> {
    match config.get_bool(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
