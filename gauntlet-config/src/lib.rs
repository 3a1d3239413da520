//! Loader for Gauntlet configuration with YAML + environment overlays.
//!
//! Files merge in the order they are attached; `GAUNTLET__`-prefixed
//! environment variables are layered on top of every file, and `${VAR}`
//! placeholders inside string values are expanded after the merge. The
//! loader is schema-agnostic: [`GauntletConfigLoader::load`] deserializes
//! into whatever type the caller asks for.
use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML files + env overrides).
pub struct GauntletConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GauntletConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GauntletConfigLoader {
    /// Start an empty loader. Environment variables are merged at
    /// [`load`](Self::load) time so they override every attached file.
    ///
    /// ```
    /// use gauntlet_config::GauntletConfigLoader;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Probe {
    ///     base_url: String,
    /// }
    ///
    /// let probe: Probe = GauntletConfigLoader::new()
    ///     .with_yaml_str("base_url: http://localhost:8080")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(probe.base_url, "http://localhost:8080");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix. A missing file makes [`load`](Self::load) fail.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file), but a missing file is silently
    /// skipped. Runs configured purely through environment variables pass a
    /// default path here without having to create it.
    pub fn with_file_if_present<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `GAUNTLET__`-prefixed environment variables (with `__` separating
    /// nested keys, values parsed into bools/numbers where they fit) take
    /// precedence over file values, and `${VAR}` placeholders are expanded
    /// before the typed struct is materialised.
    ///
    /// ```
    /// use gauntlet_config::GauntletConfigLoader;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Probe {
    ///     base_url: String,
    /// }
    ///
    /// unsafe { std::env::set_var("PLAYGROUND_HOST", "playground.local"); }
    ///
    /// let probe: Probe = GauntletConfigLoader::new()
    ///     .with_yaml_str("base_url: \"http://${PLAYGROUND_HOST}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(probe.base_url, "http://playground.local");
    ///
    /// unsafe { std::env::remove_var("PLAYGROUND_HOST"); }
    /// ```
    pub fn load<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("GAUNTLET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first, expand `${VAR}` placeholders,
        // then materialise the caller's type.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

/// Resolve which config file a run should read, if any.
///
/// Precedence: `GAUNTLET_CONFIG`, then `./gauntlet.yaml`, then
/// `<user config dir>/gauntlet/gauntlet.yaml`. An explicitly named file is
/// returned without an existence check so that a typo fails loudly; the
/// fallbacks are only returned when they actually exist.
pub fn resolve_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("GAUNTLET_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    let local = PathBuf::from("gauntlet.yaml");
    if local.exists() {
        return Some(local);
    }

    default_config_path().filter(|p| p.exists())
}

/// Per-user fallback location: `<config dir>/gauntlet/gauntlet.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gauntlet").join("gauntlet.yaml"))
}
