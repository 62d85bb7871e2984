use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CliArgs, Config, ConfigSource, Defaults, LlmConfig, StoreConfig};

pub const ENV_PROVIDER: &str = "GOALPLAN_LLM_PROVIDER";
pub const ENV_MODEL: &str = "GOALPLAN_MODEL";
pub const ENV_HOME: &str = "GOALPLAN_HOME";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<Defaults>,
    llm: Option<LlmConfig>,
    store: Option<StoreConfig>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is given in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        Self::discover_with(start_dir, cli_args, |key| std::env::var(key).ok())
    }

    /// Path-driven variant with an injectable environment lookup, so tests
    /// never touch process-global state.
    pub fn discover_with(
        start_dir: &Path,
        cli_args: &CliArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut source_attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut llm = LlmConfig::default();
        let mut store = StoreConfig::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            debug!(path = %path.display(), "loading config file");
            let file = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;

            if let Some(file_defaults) = file.defaults {
                merge_defaults(&mut defaults, file_defaults, ConfigSource::Config, &mut source_attribution);
            }
            if let Some(file_llm) = file.llm {
                if file_llm.provider.is_some() {
                    source_attribution.insert("provider".to_string(), ConfigSource::Config);
                }
                llm = file_llm;
            }
            if let Some(file_store) = file.store {
                if file_store.state_dir.is_some() {
                    source_attribution.insert("state_dir".to_string(), ConfigSource::Config);
                }
                store = file_store;
            }
        }

        if let Some(provider) = env(ENV_PROVIDER).filter(|v| !v.trim().is_empty()) {
            llm.provider = Some(provider.trim().to_string());
            source_attribution.insert("provider".to_string(), ConfigSource::Env);
        }
        if let Some(model) = env(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            defaults.model = Some(model.trim().to_string());
            source_attribution.insert("model".to_string(), ConfigSource::Env);
        }
        if let Some(home) = env(ENV_HOME).filter(|v| !v.trim().is_empty()) {
            store.state_dir = Some(PathBuf::from(home));
            source_attribution.insert("state_dir".to_string(), ConfigSource::Env);
        }

        let cli_defaults = Defaults {
            model: cli_args.model.clone(),
            request_timeout_secs: cli_args.request_timeout_secs,
            phase_count: cli_args.phase_count,
            strict_phase_count: cli_args.strict_phase_count,
            verbose: cli_args.verbose,
        };
        merge_defaults(&mut defaults, cli_defaults, ConfigSource::Cli, &mut source_attribution);
        if let Some(provider) = &cli_args.provider {
            llm.provider = Some(provider.clone());
            source_attribution.insert("provider".to_string(), ConfigSource::Cli);
        }
        if let Some(state_dir) = &cli_args.state_dir {
            store.state_dir = Some(state_dir.clone());
            source_attribution.insert("state_dir".to_string(), ConfigSource::Cli);
        }

        let config = Config {
            defaults,
            llm,
            store,
            source_attribution,
        };
        config.validate()?;
        Ok(config)
    }

    /// Search upward from `start_dir` for `.goalplan/config.toml`, stopping at
    /// a repository root (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(".goalplan").join("config.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if [".git", ".hg", ".svn"]
                .iter()
                .any(|marker| current_dir.join(marker).exists())
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent,
                None => break,
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).with_context(|| {
                format!("Failed to parse TOML config file: {}", path.display())
            }),
            // Missing file behaves like an empty one
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }
}

fn merge_defaults(
    target: &mut Defaults,
    layer: Defaults,
    source: ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    let mut mark = |key: &str| {
        attribution.insert(key.to_string(), source);
    };
    if let Some(model) = layer.model {
        target.model = Some(model);
        mark("model");
    }
    if let Some(timeout) = layer.request_timeout_secs {
        target.request_timeout_secs = Some(timeout);
        mark("request_timeout_secs");
    }
    if let Some(count) = layer.phase_count {
        target.phase_count = Some(count);
        mark("phase_count");
    }
    if let Some(strict) = layer.strict_phase_count {
        target.strict_phase_count = Some(strict);
        mark("strict_phase_count");
    }
    if let Some(verbose) = layer.verbose {
        target.verbose = Some(verbose);
        mark("verbose");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let config_dir = dir.join(".goalplan");
        fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn no_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let config = Config::discover_with(temp.path(), &CliArgs::default(), no_env).unwrap();
        assert_eq!(config.provider(), "gemini");
        assert_eq!(config.phase_count(), 3);
        assert_eq!(config.source_of("phase_count"), ConfigSource::Default);
    }

    #[test]
    fn file_is_found_from_nested_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(
            temp.path(),
            "[defaults]\nphase_count = 5\n\n[llm]\nprovider = \"anthropic\"\n",
        );
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_with(&nested, &CliArgs::default(), no_env).unwrap();
        assert_eq!(config.phase_count(), 5);
        assert_eq!(config.provider(), "anthropic");
        assert_eq!(config.source_of("phase_count"), ConfigSource::Config);
    }

    #[test]
    fn search_stops_at_repository_root() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[defaults]\nphase_count = 5\n");
        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert!(Config::discover_config_file_from(&repo).unwrap().is_none());
    }

    #[test]
    fn precedence_cli_over_env_over_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(
            temp.path(),
            "[defaults]\nmodel = \"from-file\"\nphase_count = 4\n",
        );
        let env = |key: &str| match key {
            ENV_MODEL => Some("from-env".to_string()),
            ENV_PROVIDER => Some("anthropic".to_string()),
            _ => None,
        };

        let config = Config::discover_with(temp.path(), &CliArgs::default(), env).unwrap();
        assert_eq!(config.model(), "from-env");
        assert_eq!(config.source_of("model"), ConfigSource::Env);
        assert_eq!(config.provider(), "anthropic");

        let cli = CliArgs {
            model: Some("from-cli".to_string()),
            provider: Some("gemini".to_string()),
            ..CliArgs::default()
        };
        let config = Config::discover_with(temp.path(), &cli, env).unwrap();
        assert_eq!(config.model(), "from-cli");
        assert_eq!(config.provider(), "gemini");
        assert_eq!(config.source_of("model"), ConfigSource::Cli);
        assert_eq!(config.phase_count(), 4);
    }

    #[test]
    fn home_env_sets_state_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let env = |key: &str| (key == ENV_HOME).then(|| "/srv/goalplan".to_string());

        let config = Config::discover_with(temp.path(), &CliArgs::default(), env).unwrap();
        assert_eq!(config.state_dir(), PathBuf::from("/srv/goalplan"));
        assert_eq!(config.source_of("state_dir"), ConfigSource::Env);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[defaults\nphase_count = ");
        let cli = CliArgs {
            config_path: Some(path),
            ..CliArgs::default()
        };
        assert!(Config::discover_with(temp.path(), &cli, no_env).is_err());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[runner]\nmode = \"native\"\n");
        let cli = CliArgs {
            config_path: Some(path),
            ..CliArgs::default()
        };
        assert!(Config::discover_with(temp.path(), &cli, no_env).is_err());
    }

    #[test]
    fn explicit_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let cli = CliArgs {
            config_path: Some(temp.path().join("absent.toml")),
            ..CliArgs::default()
        };
        let config = Config::discover_with(temp.path(), &cli, no_env).unwrap();
        assert_eq!(config.phase_count(), 3);
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let cli = CliArgs {
            phase_count: Some(0),
            ..CliArgs::default()
        };
        let err = Config::discover_with(temp.path(), &cli, no_env).unwrap_err();
        assert!(err.to_string().contains("phase_count"));
    }
}
