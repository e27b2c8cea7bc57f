use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::finding::FindingKind;
use crate::domain::ingredient::{Ingredient, IngredientId};
use crate::domain::routine::TimeOfDay;
use crate::domain::rule::Severity;
use crate::knowledge::KnowledgeBase;

/// Rank assigned to heuristic findings so they sort after every explicit rule
/// of the same severity.
pub const HEURISTIC_RANK: usize = usize::MAX / 2;

/// Where the two ingredients of a pair sit in the routine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairContext {
    /// Slots holding both ingredients.
    pub shared_slots: Vec<TimeOfDay>,
}

impl PairContext {
    pub fn new(shared_slots: impl IntoIterator<Item = TimeOfDay>) -> Self {
        Self { shared_slots: shared_slots.into_iter().collect() }
    }

    /// A pair seen outside any slot, e.g. from an unscheduled product.
    pub fn unscheduled() -> Self {
        Self::default()
    }
}

/// One pair-level finding before the analyzer attaches product references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFinding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub ingredients: [IngredientId; 2],
    pub slot: Option<TimeOfDay>,
    pub issue: String,
    pub recommendation: String,
    pub can_alternate: bool,
    pub required_gap_minutes: Option<u32>,
    pub alternatives: Vec<IngredientId>,
    /// Declaration index of the rule, or [`HEURISTIC_RANK`].
    pub rank: usize,
}

pub trait ConflictResolver: Send + Sync {
    /// Every finding the pair produces. An explicit rule and the heuristics
    /// are evaluated independently and may all fire.
    fn check_pair(&self, a: &IngredientId, b: &IngredientId, context: &PairContext)
        -> Vec<PairFinding>;
}

pub struct DeterministicConflictResolver<'a> {
    knowledge: &'a KnowledgeBase,
    ph_gap_threshold: Decimal,
}

impl<'a> DeterministicConflictResolver<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, ph_gap_threshold: Decimal) -> Self {
        Self { knowledge, ph_gap_threshold }
    }

    fn explicit_rule(&self, a: &IngredientId, b: &IngredientId) -> Option<PairFinding> {
        let (rank, rule) = self.knowledge.rule_for(a, b)?;
        Some(PairFinding {
            kind: FindingKind::KnownConflict,
            severity: rule.severity,
            ingredients: [rule.pair.first().clone(), rule.pair.second().clone()],
            slot: None,
            issue: rule.rationale.clone(),
            recommendation: rule.remedy.clone(),
            can_alternate: rule.can_alternate,
            required_gap_minutes: rule.min_time_gap_minutes,
            alternatives: rule.alternatives.clone(),
            rank,
        })
    }

    fn multiple_actives(
        &self,
        a: &Ingredient,
        b: &Ingredient,
        context: &PairContext,
    ) -> Vec<PairFinding> {
        if !(a.is_active() && b.is_active()) {
            return Vec::new();
        }

        context
            .shared_slots
            .iter()
            .map(|slot| PairFinding {
                kind: FindingKind::MultipleActives,
                severity: Severity::High,
                ingredients: ordered(&a.id, &b.id),
                slot: Some(*slot),
                issue: format!(
                    "Multiple actives in the {slot} slot: {} and {}",
                    a.display_name, b.display_name
                ),
                recommendation: format!(
                    "Use {} and {} on alternate days or in different slots",
                    a.display_name, b.display_name
                ),
                can_alternate: true,
                required_gap_minutes: None,
                alternatives: Vec::new(),
                rank: HEURISTIC_RANK,
            })
            .collect()
    }

    fn ph_gap(&self, a: &Ingredient, b: &Ingredient) -> Option<PairFinding> {
        let (range_a, range_b) = (a.ph_range?, b.ph_range?);
        let gap = (range_a.midpoint() - range_b.midpoint()).abs();
        if gap <= self.ph_gap_threshold {
            return None;
        }

        Some(PairFinding {
            kind: FindingKind::PhIncompatibility,
            severity: Severity::Medium,
            ingredients: ordered(&a.id, &b.id),
            slot: None,
            issue: format!(
                "pH incompatibility: {} (pH {}-{}) and {} (pH {}-{}) are {} pH units apart",
                a.display_name,
                range_a.min,
                range_a.max,
                b.display_name,
                range_b.min,
                range_b.max,
                gap.normalize()
            ),
            recommendation: format!(
                "Apply {} and {} at different times of day, or wait 20-30 minutes between them",
                a.display_name, b.display_name
            ),
            can_alternate: true,
            required_gap_minutes: None,
            alternatives: Vec::new(),
            rank: HEURISTIC_RANK,
        })
    }
}

impl ConflictResolver for DeterministicConflictResolver<'_> {
    fn check_pair(
        &self,
        a: &IngredientId,
        b: &IngredientId,
        context: &PairContext,
    ) -> Vec<PairFinding> {
        if a == b {
            return Vec::new();
        }

        let mut findings = Vec::new();
        findings.extend(self.explicit_rule(a, b));

        if let (Some(first), Some(second)) = (self.knowledge.ingredient(a), self.knowledge.ingredient(b))
        {
            findings.extend(self.multiple_actives(first, second, context));
            findings.extend(self.ph_gap(first, second));
        }

        findings
    }
}

fn ordered(a: &IngredientId, b: &IngredientId) -> [IngredientId; 2] {
    if a <= b {
        [a.clone(), b.clone()]
    } else {
        [b.clone(), a.clone()]
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ConflictResolver, DeterministicConflictResolver, PairContext};
    use crate::domain::finding::FindingKind;
    use crate::domain::ingredient::{Ingredient, IngredientCategory, IngredientId};
    use crate::domain::routine::TimeOfDay;
    use crate::domain::rule::{ConflictRule, Severity};
    use crate::knowledge::KnowledgeBase;

    fn id(value: &str) -> IngredientId {
        IngredientId::new(value)
    }

    fn fixture() -> KnowledgeBase {
        KnowledgeBase::builder()
            .ingredient(
                Ingredient::new("acid", "Acid", IngredientCategory::Active)
                    .with_ph(Decimal::from(3), Decimal::from(4)),
            )
            .ingredient(
                Ingredient::new("peptide", "Peptide", IngredientCategory::Peptide)
                    .with_ph(Decimal::from(7), Decimal::from(8)),
            )
            .ingredient(
                Ingredient::new("retinoid", "Retinoid", IngredientCategory::Active)
                    .with_ph(Decimal::from(5), Decimal::from(6)),
            )
            .ingredient(
                Ingredient::new("buffer", "Buffer", IngredientCategory::Humectant)
                    .with_ph(Decimal::new(65, 1), Decimal::new(75, 1)),
            )
            .rule(ConflictRule::new("acid", "retinoid", Severity::High, "irritates", "alternate"))
            .build()
            .expect("fixture knowledge base")
    }

    #[test]
    fn explicit_rule_is_symmetric() {
        let knowledge = fixture();
        let resolver = DeterministicConflictResolver::new(&knowledge, Decimal::from(3));
        let context = PairContext::unscheduled();

        let forward = resolver.check_pair(&id("acid"), &id("retinoid"), &context);
        let reverse = resolver.check_pair(&id("retinoid"), &id("acid"), &context);

        assert_eq!(forward, reverse);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].kind, FindingKind::KnownConflict);
        assert_eq!(forward[0].severity, Severity::High);
    }

    #[test]
    fn heuristics_co_occur_with_explicit_rule() {
        let knowledge = fixture();
        let resolver = DeterministicConflictResolver::new(&knowledge, Decimal::from(3));

        let findings = resolver.check_pair(
            &id("acid"),
            &id("retinoid"),
            &PairContext::new([TimeOfDay::Evening]),
        );

        let kinds = findings.iter().map(|finding| finding.kind).collect::<Vec<_>>();
        assert_eq!(kinds, vec![FindingKind::KnownConflict, FindingKind::MultipleActives]);
        assert_eq!(findings[1].slot, Some(TimeOfDay::Evening));
    }

    #[test]
    fn ph_gap_must_exceed_threshold() {
        let knowledge = fixture();
        let resolver = DeterministicConflictResolver::new(&knowledge, Decimal::from(3));
        let context = PairContext::unscheduled();

        // midpoints 3.5 and 7.5: gap 4
        let wide = resolver.check_pair(&id("acid"), &id("peptide"), &context);
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0].kind, FindingKind::PhIncompatibility);
        assert_eq!(wide[0].severity, Severity::Medium);

        // midpoints 3.5 and 7.0: gap exactly 3.5 vs threshold 3.5
        let strict = DeterministicConflictResolver::new(&knowledge, Decimal::new(35, 1));
        assert!(strict.check_pair(&id("acid"), &id("buffer"), &context).is_empty());
    }

    #[test]
    fn unknown_ids_and_self_pairs_produce_nothing() {
        let knowledge = fixture();
        let resolver = DeterministicConflictResolver::new(&knowledge, Decimal::from(3));
        let context = PairContext::new([TimeOfDay::Morning]);

        assert!(resolver.check_pair(&id("acid"), &id("acid"), &context).is_empty());
        assert!(resolver.check_pair(&id("acid"), &id("mystery"), &context).is_empty());
    }
}
