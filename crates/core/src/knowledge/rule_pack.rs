use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::ingredient::Ingredient;
use crate::domain::rule::ConflictRule;
use crate::errors::ApplicationError;

use super::keywords::{ConcernKeywordRow, SkinTypeKeywordRow};

/// TOML document extending or replacing the reference data.
///
/// ```toml
/// version = "clinic-2026.10"
///
/// [[ingredients]]
/// id = "bakuchiol"
/// display_name = "Bakuchiol"
/// category = "botanical"
/// aliases = ["psoralea corylifolia seed extract"]
///
/// [[rules]]
/// pair = ["bakuchiol", "glycolic-acid"]
/// severity = "low"
/// rationale = "Both can sensitize freshly exfoliated skin"
/// remedy = "Apply on separate evenings for the first weeks"
///
/// [[cautions]]
/// skin_type = "sensitive"
/// keyword = "menthol"
/// note = "Menthol can sting reactive skin"
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RulePack {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub rules: Vec<ConflictRule>,
    #[serde(default)]
    pub cautions: Vec<SkinTypeKeywordRow>,
    #[serde(default)]
    pub benefits: Vec<SkinTypeKeywordRow>,
    #[serde(default)]
    pub concern_notes: Vec<ConcernKeywordRow>,
}

impl RulePack {
    pub fn from_toml_str(raw: &str) -> Result<Self, ApplicationError> {
        toml::from_str::<RulePack>(raw)
            .map_err(|error| ApplicationError::RulePack(format!("could not parse rule pack: {error}")))
    }

    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            ApplicationError::RulePack(format!(
                "could not read rule pack `{}`: {error}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
            && self.rules.is_empty()
            && self.cautions.is_empty()
            && self.benefits.is_empty()
            && self.concern_notes.is_empty()
    }
}
