use serde::Serialize;
use skinsafe_core::config::{AppConfig, LoadOptions};
use skinsafe_core::{DeterministicSafetyEngine, Routine, RoutineSafetyEngine};

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_KNOWLEDGE_BASE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let (report, exit_code) = build_report(options);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> (DoctorReport, u8) {
    let mut checks = Vec::new();
    let mut exit_code = 0;

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_rule_pack(&config));

            match DeterministicSafetyEngine::from_config(&config) {
                Ok(engine) => {
                    let knowledge = engine.knowledge();
                    checks.push(DoctorCheck {
                        name: "knowledge_base_build",
                        status: CheckStatus::Pass,
                        details: format!(
                            "knowledge base `{}` built with {} ingredients and {} rules",
                            knowledge.version(),
                            knowledge.ingredients().len(),
                            knowledge.rules().len()
                        ),
                    });
                    checks.push(check_empty_routine(&engine));
                }
                Err(error) => {
                    exit_code = EXIT_KNOWLEDGE_BASE;
                    checks.push(DoctorCheck {
                        name: "knowledge_base_build",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("analysis_smoke", "knowledge base did not build"));
                }
            }
        }
        Err(error) => {
            exit_code = EXIT_CONFIG;
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("rule_pack", "configuration did not load"));
            checks.push(skipped("knowledge_base_build", "configuration did not load"));
            checks.push(skipped("analysis_smoke", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    (DoctorReport { overall_status, summary, checks }, exit_code)
}

fn check_rule_pack(config: &AppConfig) -> DoctorCheck {
    match &config.knowledge_base.rule_pack_path {
        Some(path) if path.is_file() => DoctorCheck {
            name: "rule_pack",
            status: CheckStatus::Pass,
            details: format!("rule pack found at `{}`", path.display()),
        },
        Some(path) => DoctorCheck {
            name: "rule_pack",
            status: CheckStatus::Fail,
            details: format!("rule pack `{}` does not exist", path.display()),
        },
        None => skipped("rule_pack", "no rule pack configured; builtin data only"),
    }
}

fn check_empty_routine(engine: &DeterministicSafetyEngine) -> DoctorCheck {
    let result = engine.analyze(&Routine::default());
    if !result.has_conflicts && result.safety_score == 100 {
        DoctorCheck {
            name: "analysis_smoke",
            status: CheckStatus::Pass,
            details: "empty routine scores 100 with no findings".to_string(),
        }
    } else {
        DoctorCheck {
            name: "analysis_smoke",
            status: CheckStatus::Fail,
            details: format!(
                "empty routine produced {} findings and score {}",
                result.findings.len(),
                result.safety_score
            ),
        }
    }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
