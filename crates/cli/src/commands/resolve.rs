use serde::Serialize;
use skinsafe_core::config::LoadOptions;
use skinsafe_core::{normalize_name, IngredientId, MatchTier};

use crate::commands::{build_engine, CommandResult, EXIT_INPUT};

#[derive(Debug, Serialize)]
struct ResolvedName {
    raw: String,
    normalized: String,
    canonical_id: Option<IngredientId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<MatchTier>,
}

#[derive(Debug, Serialize)]
struct ResolveReport {
    knowledge_version: String,
    names: Vec<ResolvedName>,
}

pub fn run(options: &LoadOptions, names: &[String]) -> CommandResult {
    if names.is_empty() {
        return CommandResult::failure(
            "resolve",
            "invalid_input",
            "at least one ingredient name is required",
            EXIT_INPUT,
        );
    }
    let engine = match build_engine("resolve", options) {
        Ok(engine) => engine,
        Err(failure) => return failure,
    };

    let names = names
        .iter()
        .map(|raw| {
            let resolution = engine.resolve(raw);
            ResolvedName {
                raw: raw.clone(),
                normalized: normalize_name(raw),
                canonical_id: resolution.as_ref().map(|resolution| resolution.id.clone()),
                tier: resolution.map(|resolution| resolution.tier),
            }
        })
        .collect();

    CommandResult::success(
        "resolve",
        ResolveReport { knowledge_version: engine.knowledge().version().to_string(), names },
    )
}
