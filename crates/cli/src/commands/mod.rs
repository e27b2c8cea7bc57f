pub mod addition;
pub mod analyze;
pub mod config;
pub mod doctor;
pub mod personalize;
pub mod resolve;
pub mod rules;

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use skinsafe_core::config::{AppConfig, LoadOptions};
use skinsafe_core::errors::ApplicationError;
use skinsafe_core::DeterministicSafetyEngine;
use uuid::Uuid;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT: u8 = 3;
pub const EXIT_KNOWLEDGE_BASE: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T> {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
}

impl CommandResult {
    pub fn success<T: Serialize>(command: &str, result: T) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: None,
            detail: None,
            correlation_id: None,
            result: Some(result),
        };
        Self { exit_code: 0, output: serialize_payload(&payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: Some(message.into()),
            detail: None,
            correlation_id: None,
            result: None,
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }

    /// Failure backed by an application error. The payload carries the
    /// interface-level message and a fresh correlation id; the full error goes
    /// to `detail` and the log.
    pub fn application_failure(
        command: &str,
        error_class: &str,
        error: ApplicationError,
        exit_code: u8,
    ) -> Self {
        let detail = error.to_string();
        let interface = error.into_interface(Uuid::new_v4().to_string());
        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class,
            correlation_id = interface.correlation_id(),
            error = %detail,
            "command failed"
        );

        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: Some(interface.user_message().to_string()),
            detail: Some(detail),
            correlation_id: Some(interface.correlation_id().to_string()),
            result: None,
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

fn serialize_payload<T: Serialize>(payload: &CommandOutcome<T>) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::application_failure(
            command,
            "config_validation",
            ApplicationError::Configuration(error.to_string()),
            EXIT_CONFIG,
        )
    })
}

pub(crate) fn build_engine(
    command: &str,
    options: &LoadOptions,
) -> Result<DeterministicSafetyEngine, CommandResult> {
    let config = load_config(command, options)?;
    DeterministicSafetyEngine::from_config(&config).map_err(|error| {
        CommandResult::application_failure(command, "knowledge_base", error, EXIT_KNOWLEDGE_BASE)
    })
}

pub(crate) fn read_input<T: DeserializeOwned>(
    command: &str,
    kind: &str,
    path: &Path,
) -> Result<T, CommandResult> {
    parse_json_file(kind, path).map_err(|error| {
        CommandResult::failure(command, "invalid_input", format!("{error:#}"), EXIT_INPUT)
    })
}

fn parse_json_file<T: DeserializeOwned>(kind: &str, path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read {kind} file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse {kind} file `{}`", path.display()))
}
