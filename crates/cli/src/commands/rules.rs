use serde::Serialize;
use skinsafe_core::config::LoadOptions;
use skinsafe_core::{ConflictRule, IngredientId};

use crate::commands::{build_engine, CommandResult, EXIT_INPUT};

#[derive(Debug, Serialize)]
struct RuleListing {
    knowledge_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ingredient: Option<IngredientId>,
    rules: Vec<ConflictRule>,
}

pub fn run(options: &LoadOptions, ingredient: Option<&str>) -> CommandResult {
    let engine = match build_engine("rules", options) {
        Ok(engine) => engine,
        Err(failure) => return failure,
    };
    let knowledge = engine.knowledge();

    let filter = match ingredient {
        Some(raw) => match knowledge.resolve(raw) {
            Some(id) => Some(id),
            None => {
                return CommandResult::failure(
                    "rules",
                    "invalid_input",
                    format!("`{}` does not match any known ingredient", raw.trim()),
                    EXIT_INPUT,
                );
            }
        },
        None => None,
    };

    let rules = match &filter {
        Some(id) => knowledge.rules_involving(id).cloned().collect(),
        None => knowledge.rules().to_vec(),
    };

    CommandResult::success(
        "rules",
        RuleListing {
            knowledge_version: knowledge.version().to_string(),
            ingredient: filter,
            rules,
        },
    )
}
