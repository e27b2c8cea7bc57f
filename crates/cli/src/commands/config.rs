use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use skinsafe_core::config::{AppConfig, LoadOptions, LogFormat};
use toml::Value;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    precedence: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    entries: Vec<ConfigEntry>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("config", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = fields(&config)
        .into_iter()
        .map(|field| ConfigEntry {
            key: field.key,
            source: source(field.key, field.env_keys),
            value: field.value,
        })
        .collect();

    CommandResult::success(
        "config",
        EffectiveConfig {
            precedence: "override > env > file > default",
            config_file: config_file_path.map(|path| path.display().to_string()),
            entries,
        },
    )
}

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key: "knowledge_base.rule_pack_path",
            env_keys: &["SKINSAFE_RULE_PACK_PATH"],
            value: config
                .knowledge_base
                .rule_pack_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key: "knowledge_base.include_builtin",
            env_keys: &["SKINSAFE_INCLUDE_BUILTIN"],
            value: config.knowledge_base.include_builtin.to_string(),
        },
        Field {
            key: "analysis.ph_gap_threshold",
            env_keys: &["SKINSAFE_PH_GAP_THRESHOLD"],
            value: config.analysis.ph_gap_threshold.to_string(),
        },
        Field {
            key: "analysis.suppress_honored_slot_rules",
            env_keys: &["SKINSAFE_SUPPRESS_HONORED_SLOT_RULES"],
            value: config.analysis.suppress_honored_slot_rules.to_string(),
        },
        Field {
            key: "optimizer.max_passes",
            env_keys: &["SKINSAFE_OPTIMIZER_MAX_PASSES"],
            value: config.optimizer.max_passes.to_string(),
        },
        Field {
            key: "personalization.max_notes",
            env_keys: &["SKINSAFE_PERSONALIZATION_MAX_NOTES"],
            value: config.personalization.max_notes.to_string(),
        },
        Field {
            key: "logging.level",
            env_keys: &["SKINSAFE_LOGGING_LEVEL", "SKINSAFE_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_keys: &["SKINSAFE_LOGGING_FORMAT", "SKINSAFE_LOG_FORMAT"],
            value: format_label(config.logging.format).to_string(),
        },
    ]
}

fn format_label(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("skinsafe.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/skinsafe.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{contains_path, field_source};
    use toml::Value;

    #[test]
    fn nested_keys_are_attributed_to_the_file() {
        let doc = "[analysis]\nph_gap_threshold = 2.5\n".parse::<Value>().expect("toml");

        assert!(contains_path(&doc, "analysis.ph_gap_threshold"));
        assert!(!contains_path(&doc, "analysis.suppress_honored_slot_rules"));
        assert_eq!(
            field_source("analysis.ph_gap_threshold", &["SKINSAFE_TEST_UNSET_KEY"], Some(&doc), None),
            "file (config file)"
        );
        assert_eq!(field_source("optimizer.max_passes", &[], Some(&doc), None), "default");
    }
}
