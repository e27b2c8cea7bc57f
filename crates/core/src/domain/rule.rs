use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientId;

/// Qualitative risk tier. The declaration order is the total order used for
/// score deductions and recommendation grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Dangerous,
}

impl Severity {
    pub const DESCENDING: [Severity; 4] =
        [Severity::Dangerous, Severity::High, Severity::Medium, Severity::Low];

    pub fn score_deduction(&self) -> u32 {
        match self {
            Severity::Dangerous => 40,
            Severity::High => 25,
            Severity::Medium => 15,
            Severity::Low => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Dangerous => "dangerous",
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            Severity::Dangerous => "DANGEROUS: do not combine these ingredients as applied",
            Severity::High => "HIGH RISK: change how these ingredients are scheduled",
            Severity::Medium => "CAUTION: adjust timing or frequency",
            Severity::Low => "NOTE: minor interaction worth knowing about",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unordered ingredient pair. Construction sorts the members, so `(a, b)` and
/// `(b, a)` produce the same key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(IngredientId, IngredientId)", into = "(IngredientId, IngredientId)")]
pub struct PairKey {
    first: IngredientId,
    second: IngredientId,
}

impl PairKey {
    pub fn new(a: IngredientId, b: IngredientId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &IngredientId {
        &self.first
    }

    pub fn second(&self) -> &IngredientId {
        &self.second
    }

    pub fn contains(&self, id: &IngredientId) -> bool {
        &self.first == id || &self.second == id
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }

    pub fn other(&self, id: &IngredientId) -> Option<&IngredientId> {
        if &self.first == id {
            Some(&self.second)
        } else if &self.second == id {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl From<(IngredientId, IngredientId)> for PairKey {
    fn from((a, b): (IngredientId, IngredientId)) -> Self {
        Self::new(a, b)
    }
}

impl From<PairKey> for (IngredientId, IngredientId) {
    fn from(key: PairKey) -> Self {
        (key.first, key.second)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.first, self.second)
    }
}

/// The "use X in the morning, Y in the evening" assignment a rule's remedy
/// prescribes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGuidance {
    pub morning: IngredientId,
    pub evening: IngredientId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    pub pair: PairKey,
    pub severity: Severity,
    pub rationale: String,
    pub remedy: String,
    #[serde(default)]
    pub min_time_gap_minutes: Option<u32>,
    #[serde(default)]
    pub alternatives: Vec<IngredientId>,
    #[serde(default)]
    pub can_alternate: bool,
    #[serde(default)]
    pub slot_guidance: Option<SlotGuidance>,
}

impl ConflictRule {
    pub fn new(
        a: impl Into<String>,
        b: impl Into<String>,
        severity: Severity,
        rationale: impl Into<String>,
        remedy: impl Into<String>,
    ) -> Self {
        Self {
            pair: PairKey::new(IngredientId::new(a), IngredientId::new(b)),
            severity,
            rationale: rationale.into(),
            remedy: remedy.into(),
            min_time_gap_minutes: None,
            alternatives: Vec::new(),
            can_alternate: false,
            slot_guidance: None,
        }
    }

    pub fn with_time_gap(mut self, minutes: u32) -> Self {
        self.min_time_gap_minutes = Some(minutes);
        self
    }

    pub fn with_alternatives<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives.extend(ids.into_iter().map(IngredientId::new));
        self
    }

    pub fn alternating(mut self) -> Self {
        self.can_alternate = true;
        self
    }

    pub fn morning_evening(mut self, morning: impl Into<String>, evening: impl Into<String>) -> Self {
        self.slot_guidance = Some(SlotGuidance {
            morning: IngredientId::new(morning),
            evening: IngredientId::new(evening),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{PairKey, Severity};
    use crate::domain::ingredient::IngredientId;

    #[test]
    fn pair_key_ignores_argument_order() {
        let forward = PairKey::new(IngredientId::new("retinol"), IngredientId::new("vitamin-c"));
        let reverse = PairKey::new(IngredientId::new("vitamin-c"), IngredientId::new("retinol"));
        assert_eq!(forward, reverse);
        assert_eq!(forward.first().as_str(), "retinol");
        assert_eq!(
            forward.other(&IngredientId::new("retinol")),
            Some(&IngredientId::new("vitamin-c"))
        );
    }

    #[test]
    fn severity_order_is_total_and_drives_deduction() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Dangerous);

        let deductions =
            Severity::DESCENDING.iter().map(Severity::score_deduction).collect::<Vec<_>>();
        assert_eq!(deductions, vec![40, 25, 15, 5]);
    }
}
