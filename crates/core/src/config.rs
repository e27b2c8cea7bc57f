use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EngineSettings;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppConfig {
    pub knowledge_base: KnowledgeBaseConfig,
    pub analysis: AnalysisConfig,
    pub optimizer: OptimizerConfig,
    pub personalization: PersonalizationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseConfig {
    /// TOML rule pack layered over (or replacing) the builtin data.
    pub rule_pack_path: Option<PathBuf>,
    pub include_builtin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    pub ph_gap_threshold: Decimal,
    pub suppress_honored_slot_rules: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptimizerConfig {
    pub max_passes: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PersonalizationConfig {
    pub max_notes: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub rule_pack_path: Option<PathBuf>,
    pub include_builtin: Option<bool>,
    pub ph_gap_threshold: Option<Decimal>,
    pub suppress_honored_slot_rules: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            knowledge_base: KnowledgeBaseConfig { rule_pack_path: None, include_builtin: true },
            analysis: AnalysisConfig {
                ph_gap_threshold: Decimal::from(3),
                suppress_honored_slot_rules: false,
            },
            optimizer: OptimizerConfig { max_passes: 4 },
            personalization: PersonalizationConfig { max_notes: 5 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("skinsafe.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            ph_gap_threshold: self.analysis.ph_gap_threshold,
            suppress_honored_slot_rules: self.analysis.suppress_honored_slot_rules,
            max_passes: self.optimizer.max_passes,
            max_notes: self.personalization.max_notes,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(knowledge_base) = patch.knowledge_base {
            if let Some(rule_pack_path) = knowledge_base.rule_pack_path {
                self.knowledge_base.rule_pack_path = Some(rule_pack_path);
            }
            if let Some(include_builtin) = knowledge_base.include_builtin {
                self.knowledge_base.include_builtin = include_builtin;
            }
        }

        if let Some(analysis) = patch.analysis {
            if let Some(ph_gap_threshold) = analysis.ph_gap_threshold {
                self.analysis.ph_gap_threshold = ph_gap_threshold;
            }
            if let Some(suppress) = analysis.suppress_honored_slot_rules {
                self.analysis.suppress_honored_slot_rules = suppress;
            }
        }

        if let Some(max_passes) = patch.optimizer.and_then(|optimizer| optimizer.max_passes) {
            self.optimizer.max_passes = max_passes;
        }

        if let Some(max_notes) =
            patch.personalization.and_then(|personalization| personalization.max_notes)
        {
            self.personalization.max_notes = max_notes;
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SKINSAFE_RULE_PACK_PATH") {
            self.knowledge_base.rule_pack_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("SKINSAFE_INCLUDE_BUILTIN") {
            self.knowledge_base.include_builtin = parse_bool("SKINSAFE_INCLUDE_BUILTIN", &value)?;
        }

        if let Some(value) = read_env("SKINSAFE_PH_GAP_THRESHOLD") {
            self.analysis.ph_gap_threshold = parse_decimal("SKINSAFE_PH_GAP_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("SKINSAFE_SUPPRESS_HONORED_SLOT_RULES") {
            self.analysis.suppress_honored_slot_rules =
                parse_bool("SKINSAFE_SUPPRESS_HONORED_SLOT_RULES", &value)?;
        }

        if let Some(value) = read_env("SKINSAFE_OPTIMIZER_MAX_PASSES") {
            self.optimizer.max_passes = parse_u32("SKINSAFE_OPTIMIZER_MAX_PASSES", &value)?;
        }
        if let Some(value) = read_env("SKINSAFE_PERSONALIZATION_MAX_NOTES") {
            self.personalization.max_notes =
                parse_usize("SKINSAFE_PERSONALIZATION_MAX_NOTES", &value)?;
        }

        let log_level =
            read_env("SKINSAFE_LOGGING_LEVEL").or_else(|| read_env("SKINSAFE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SKINSAFE_LOGGING_FORMAT").or_else(|| read_env("SKINSAFE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rule_pack_path) = overrides.rule_pack_path {
            self.knowledge_base.rule_pack_path = Some(rule_pack_path);
        }
        if let Some(include_builtin) = overrides.include_builtin {
            self.knowledge_base.include_builtin = include_builtin;
        }
        if let Some(ph_gap_threshold) = overrides.ph_gap_threshold {
            self.analysis.ph_gap_threshold = ph_gap_threshold;
        }
        if let Some(suppress) = overrides.suppress_honored_slot_rules {
            self.analysis.suppress_honored_slot_rules = suppress;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_knowledge_base(&self.knowledge_base)?;
        validate_analysis(&self.analysis)?;
        validate_optimizer(&self.optimizer)?;
        validate_personalization(&self.personalization)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("skinsafe.toml"), PathBuf::from("config/skinsafe.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_knowledge_base(knowledge_base: &KnowledgeBaseConfig) -> Result<(), ConfigError> {
    match &knowledge_base.rule_pack_path {
        Some(path) if path.as_os_str().is_empty() => Err(ConfigError::Validation(
            "knowledge_base.rule_pack_path must not be empty when set".to_string(),
        )),
        None if !knowledge_base.include_builtin => Err(ConfigError::Validation(
            "knowledge_base.include_builtin is false but no rule_pack_path is configured"
                .to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_analysis(analysis: &AnalysisConfig) -> Result<(), ConfigError> {
    let threshold = analysis.ph_gap_threshold;
    if threshold <= Decimal::ZERO || threshold > Decimal::from(14) {
        return Err(ConfigError::Validation(
            "analysis.ph_gap_threshold must be greater than 0 and at most 14".to_string(),
        ));
    }

    Ok(())
}

fn validate_optimizer(optimizer: &OptimizerConfig) -> Result<(), ConfigError> {
    if optimizer.max_passes == 0 || optimizer.max_passes > 16 {
        return Err(ConfigError::Validation(
            "optimizer.max_passes must be in range 1..=16".to_string(),
        ));
    }

    Ok(())
}

fn validate_personalization(personalization: &PersonalizationConfig) -> Result<(), ConfigError> {
    if personalization.max_notes == 0 || personalization.max_notes > 50 {
        return Err(ConfigError::Validation(
            "personalization.max_notes must be in range 1..=50".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    knowledge_base: Option<KnowledgeBasePatch>,
    analysis: Option<AnalysisPatch>,
    optimizer: Option<OptimizerPatch>,
    personalization: Option<PersonalizationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgeBasePatch {
    rule_pack_path: Option<PathBuf>,
    include_builtin: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisPatch {
    ph_gap_threshold: Option<Decimal>,
    suppress_honored_slot_rules: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct OptimizerPatch {
    max_passes: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct PersonalizationPatch {
    max_notes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn isolated_options() -> Result<(TempDir, LoadOptions), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let options = LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            ..LoadOptions::default()
        };
        Ok((dir, options))
    }

    #[test]
    fn defaults_are_valid_without_a_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        let (_dir, options) = isolated_options()?;

        let config =
            AppConfig::load(options).map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.knowledge_base.include_builtin, "builtin data is on by default")?;
        ensure(config.analysis.ph_gap_threshold == Decimal::from(3), "default pH gap is 3")?;
        ensure(!config.analysis.suppress_honored_slot_rules, "rules fire regardless of slots")?;
        ensure(config.optimizer.max_passes == 4, "default optimizer passes")?;
        ensure(config.personalization.max_notes == 5, "default note cap")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logs by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SKINSAFE_PACK_DIR", "/srv/packs");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("skinsafe.toml");
            fs::write(
                &path,
                r#"
[knowledge_base]
rule_pack_path = "${TEST_SKINSAFE_PACK_DIR}/clinic.toml"

[analysis]
ph_gap_threshold = 2.5
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.knowledge_base.rule_pack_path
                    == Some(PathBuf::from("/srv/packs/clinic.toml")),
                "rule pack path should be interpolated from environment",
            )?;
            ensure(
                config.analysis.ph_gap_threshold == Decimal::new(25, 1),
                "pH gap threshold should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_SKINSAFE_PACK_DIR"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKINSAFE_LOG_LEVEL", "warn");
        env::set_var("SKINSAFE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let (_dir, options) = isolated_options()?;
            let config =
                AppConfig::load(options).map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["SKINSAFE_LOG_LEVEL", "SKINSAFE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKINSAFE_OPTIMIZER_MAX_PASSES", "8");
        env::set_var("SKINSAFE_PH_GAP_THRESHOLD", "3.5");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("skinsafe.toml");
            fs::write(
                &path,
                r#"
[analysis]
ph_gap_threshold = 2.0
suppress_honored_slot_rules = true

[optimizer]
max_passes = 2

[personalization]
max_notes = 7

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    ph_gap_threshold: Some(Decimal::from(4)),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.analysis.ph_gap_threshold == Decimal::from(4),
                "override pH gap should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.optimizer.max_passes == 8, "env max passes should win over file")?;
            ensure(config.personalization.max_notes == 7, "file note cap should win over default")?;
            ensure(config.analysis.suppress_honored_slot_rules, "file toggle should be kept")?;

            let settings = config.engine_settings();
            ensure(settings.max_passes == 8, "engine settings mirror optimizer passes")?;
            ensure(settings.max_notes == 7, "engine settings mirror note cap")?;
            Ok(())
        })();

        clear_vars(&["SKINSAFE_OPTIMIZER_MAX_PASSES", "SKINSAFE_PH_GAP_THRESHOLD"]);
        result
    }

    #[test]
    fn invalid_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKINSAFE_OPTIMIZER_MAX_PASSES", "many");

        let result = (|| -> Result<(), String> {
            let (_dir, options) = isolated_options()?;
            let error = match AppConfig::load(options) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "SKINSAFE_OPTIMIZER_MAX_PASSES"
                ),
                "error should name the offending variable",
            )
        })();

        clear_vars(&["SKINSAFE_OPTIMIZER_MAX_PASSES"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKINSAFE_INCLUDE_BUILTIN", "false");

        let result = (|| -> Result<(), String> {
            let (_dir, options) = isolated_options()?;
            let error = match AppConfig::load(options) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("rule_pack_path")
            );
            ensure(has_message, "validation failure should mention rule_pack_path")
        })();

        clear_vars(&["SKINSAFE_INCLUDE_BUILTIN"]);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        let (_dir, mut options) = isolated_options()?;
        options.require_file = true;

        ensure(
            matches!(AppConfig::load(options), Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }
}
