use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientId;
use crate::domain::routine::TimeOfDay;
use crate::domain::rule::Severity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// An explicit pairwise rule from the knowledge base.
    KnownConflict,
    MultipleActives,
    PhIncompatibility,
    WrongTimeOfDay,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictFinding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub ingredients: Vec<IngredientId>,
    /// Slot entries (product names or raw ingredient names) the finding touches.
    pub products: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeOfDay>,
    pub issue: String,
    pub recommendation: String,
    pub can_alternate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_gap_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<IngredientId>,
}

impl ConflictFinding {
    pub fn involves(&self, id: &IngredientId) -> bool {
        self.ingredients.contains(id)
    }

    pub fn touches_product(&self, name: &str) -> bool {
        let name = name.trim();
        self.products.iter().any(|product| product.trim().eq_ignore_ascii_case(name))
    }
}

/// One raw ingredient string as the caller supplied it, with its resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientMention {
    pub raw: String,
    pub canonical_id: Option<IngredientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyNote {
    pub ingredients: [IngredientId; 2],
    pub note: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizedRoutine {
    pub morning: Vec<String>,
    pub evening: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub has_conflicts: bool,
    pub findings: Vec<ConflictFinding>,
    pub safety_score: u8,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_routine: Option<OptimizedRoutine>,
    #[serde(default)]
    pub ingredients: Vec<IngredientMention>,
    #[serde(default)]
    pub synergies: Vec<SynergyNote>,
}

impl AnalysisResult {
    pub fn warnings(&self) -> &[String] {
        self.optimized_routine.as_ref().map(|routine| routine.warnings.as_slice()).unwrap_or(&[])
    }

    pub fn unresolved_ingredients(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .iter()
            .filter(|mention| mention.canonical_id.is_none())
            .map(|mention| mention.raw.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionReport {
    pub safe: bool,
    pub conflicts: Vec<ConflictFinding>,
    pub suggestions: Vec<String>,
}
