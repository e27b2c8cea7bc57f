//! Routine-level aggregation.
//!
//! The analyzer resolves every ingredient in a routine, runs the pair resolver
//! over all unique pairs of distinct canonical ingredients (same-slot and
//! cross-slot), adds the slot scans, and folds the result into a scored,
//! ordered [`AnalysisResult`].

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::finding::{
    AnalysisResult, ConflictFinding, FindingKind, IngredientMention, SynergyNote,
};
use crate::domain::ingredient::IngredientId;
use crate::domain::routine::{Routine, TimeOfDay};
use crate::domain::rule::Severity;
use crate::engine::EngineSettings;
use crate::knowledge::KnowledgeBase;
use crate::optimizer::RoutineOptimizer;
use crate::resolver::{
    ConflictResolver, DeterministicConflictResolver, PairContext, PairFinding, HEURISTIC_RANK,
};

pub const NO_CONFLICTS_MESSAGE: &str =
    "No conflicts detected. Your routine looks compatible as scheduled.";

pub const CLOSING_TIPS: [&str; 2] = [
    "Introduce new actives gradually, one product at a time.",
    "Monitor your skin for 2-4 weeks after any change and stop if irritation persists.",
];

#[derive(Clone, Debug, Default)]
pub(crate) struct Occurrence {
    pub slots: BTreeSet<TimeOfDay>,
    pub unscheduled: bool,
    /// Slot entry (product name or raw ingredient) that introduced the id.
    pub sources: Vec<(Option<TimeOfDay>, String)>,
}

/// A routine flattened into ingredient mentions and per-id occurrences.
#[derive(Clone, Debug, Default)]
pub(crate) struct ResolvedRoutine {
    pub mentions: Vec<IngredientMention>,
    pub occurrences: BTreeMap<IngredientId, Occurrence>,
}

impl ResolvedRoutine {
    pub(crate) fn resolve(knowledge: &KnowledgeBase, routine: &Routine) -> Self {
        let mut resolved = Self::default();

        for slot in TimeOfDay::ALL {
            for entry in routine.slot(slot) {
                match routine.find_product(entry) {
                    Some(product) => {
                        for raw in &product.ingredients {
                            resolved.record(knowledge, raw, Some(slot), Some(&product.name));
                        }
                    }
                    None => resolved.record(knowledge, entry, Some(slot), None),
                }
            }
        }

        for product in routine.unscheduled_products() {
            for raw in &product.ingredients {
                resolved.record(knowledge, raw, product.slot, Some(&product.name));
            }
        }

        resolved
    }

    fn record(
        &mut self,
        knowledge: &KnowledgeBase,
        raw: &str,
        slot: Option<TimeOfDay>,
        product: Option<&str>,
    ) {
        let canonical_id = knowledge.resolve(raw);

        if let Some(id) = &canonical_id {
            let occurrence = self.occurrences.entry(id.clone()).or_default();
            match slot {
                Some(slot) => {
                    occurrence.slots.insert(slot);
                }
                None => occurrence.unscheduled = true,
            }
            let source = product.unwrap_or(raw).to_string();
            if !occurrence.sources.iter().any(|(seen, name)| *seen == slot && *name == source) {
                occurrence.sources.push((slot, source));
            }
        }

        self.mentions.push(IngredientMention {
            raw: raw.to_string(),
            canonical_id,
            slot,
            product: product.map(str::to_string),
        });
    }

    /// Resolved ids in knowledge-base declaration order.
    pub(crate) fn ids(&self, knowledge: &KnowledgeBase) -> Vec<IngredientId> {
        let mut ids = self.occurrences.keys().cloned().collect::<Vec<_>>();
        ids.sort_by_key(|id| (knowledge.position(id).unwrap_or(usize::MAX), id.clone()));
        ids
    }

    fn shared_slots(&self, a: &IngredientId, b: &IngredientId) -> Vec<TimeOfDay> {
        match (self.occurrences.get(a), self.occurrences.get(b)) {
            (Some(first), Some(second)) => {
                first.slots.intersection(&second.slots).copied().collect()
            }
            _ => Vec::new(),
        }
    }

    fn only_in(&self, id: &IngredientId, slot: TimeOfDay) -> bool {
        self.occurrences.get(id).is_some_and(|occurrence| {
            !occurrence.unscheduled
                && occurrence.slots.len() == 1
                && occurrence.slots.contains(&slot)
        })
    }

    fn sources(&self, ids: &[IngredientId], slot: Option<TimeOfDay>) -> Vec<String> {
        let mut sources = Vec::new();
        for occurrence in ids.iter().filter_map(|id| self.occurrences.get(id)) {
            for (source_slot, name) in &occurrence.sources {
                if slot.is_some() && *source_slot != slot {
                    continue;
                }
                if !sources.contains(name) {
                    sources.push(name.clone());
                }
            }
        }
        sources
    }
}

/// Canonical ids behind one slot entry, expanding product names.
pub(crate) fn expand_entry(
    knowledge: &KnowledgeBase,
    routine: &Routine,
    entry: &str,
) -> Vec<IngredientId> {
    let mut ids = Vec::new();
    let raws = match routine.find_product(entry) {
        Some(product) => product.ingredients.iter().map(String::as_str).collect::<Vec<_>>(),
        None => vec![entry],
    };
    for id in raws.into_iter().filter_map(|raw| knowledge.resolve(raw)) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

pub(crate) fn display_name(knowledge: &KnowledgeBase, id: &IngredientId) -> String {
    knowledge
        .ingredient(id)
        .map(|ingredient| ingredient.display_name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// `a`, `a and b`, `a, b and c`.
pub(crate) fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// 100 minus the summed per-finding deductions, clamped to 0..=100.
pub fn safety_score(findings: &[ConflictFinding]) -> u8 {
    let deduction = findings.iter().map(|finding| finding.severity.score_deduction()).sum::<u32>();
    100u32.saturating_sub(deduction).min(100) as u8
}

pub fn recommendations(findings: &[ConflictFinding]) -> Vec<String> {
    if findings.is_empty() {
        return vec![NO_CONFLICTS_MESSAGE.to_string()];
    }

    let mut lines = Vec::new();
    for severity in Severity::DESCENDING {
        let mut group = findings.iter().filter(|finding| finding.severity == severity).peekable();
        if group.peek().is_none() {
            continue;
        }
        lines.push(severity.banner().to_string());
        lines.extend(group.map(|finding| finding.recommendation.clone()));
    }
    lines.extend(CLOSING_TIPS.iter().map(|tip| tip.to_string()));
    lines
}

struct RankedFinding {
    finding: ConflictFinding,
    rank: usize,
    positions: Vec<usize>,
}

pub struct RoutineAnalyzer<'a, R = DeterministicConflictResolver<'a>> {
    knowledge: &'a KnowledgeBase,
    resolver: R,
    settings: EngineSettings,
}

impl<'a> RoutineAnalyzer<'a> {
    pub fn deterministic(knowledge: &'a KnowledgeBase, settings: EngineSettings) -> Self {
        let resolver = DeterministicConflictResolver::new(knowledge, settings.ph_gap_threshold);
        Self::new(knowledge, resolver, settings)
    }
}

impl<'a, R: ConflictResolver> RoutineAnalyzer<'a, R> {
    pub fn new(knowledge: &'a KnowledgeBase, resolver: R, settings: EngineSettings) -> Self {
        Self { knowledge, resolver, settings }
    }

    pub fn analyze(&self, routine: &Routine) -> AnalysisResult {
        let resolved = ResolvedRoutine::resolve(self.knowledge, routine);
        let ids = resolved.ids(self.knowledge);

        let mut ranked = Vec::new();
        let mut actives_by_slot: BTreeMap<TimeOfDay, BTreeSet<IngredientId>> = BTreeMap::new();

        for (index, a) in ids.iter().enumerate() {
            for b in &ids[index + 1..] {
                let context = PairContext::new(resolved.shared_slots(a, b));
                for finding in self.resolver.check_pair(a, b, &context) {
                    if finding.kind == FindingKind::MultipleActives {
                        if let Some(slot) = finding.slot {
                            actives_by_slot
                                .entry(slot)
                                .or_default()
                                .extend(finding.ingredients.iter().cloned());
                        }
                        continue;
                    }
                    if self.honors_slot_guidance(&finding, &resolved) {
                        continue;
                    }
                    ranked.push(self.attach(finding, &resolved));
                }
            }
        }

        for (slot, actives) in actives_by_slot {
            ranked.push(self.multiple_actives(slot, actives, &resolved));
        }
        ranked.extend(self.wrong_time_of_day(&ids, &resolved));

        let findings = order_and_dedupe(ranked);
        let synergies = self.synergies(&ids);
        let optimized_routine = (!findings.is_empty()).then(|| {
            RoutineOptimizer::new(self.knowledge, self.settings.max_passes)
                .optimize(routine, &findings)
        });

        AnalysisResult {
            has_conflicts: !findings.is_empty(),
            safety_score: safety_score(&findings),
            recommendations: recommendations(&findings),
            findings,
            optimized_routine,
            ingredients: resolved.mentions,
            synergies,
        }
    }

    fn positions(&self, ids: &[IngredientId]) -> Vec<usize> {
        ids.iter().map(|id| self.knowledge.position(id).unwrap_or(usize::MAX)).collect()
    }

    fn attach(&self, finding: PairFinding, resolved: &ResolvedRoutine) -> RankedFinding {
        let ingredients = finding.ingredients.to_vec();
        RankedFinding {
            rank: finding.rank,
            positions: self.positions(&ingredients),
            finding: ConflictFinding {
                kind: finding.kind,
                severity: finding.severity,
                products: resolved.sources(&ingredients, finding.slot),
                ingredients,
                slot: finding.slot,
                issue: finding.issue,
                recommendation: finding.recommendation,
                can_alternate: finding.can_alternate,
                required_gap_minutes: finding.required_gap_minutes,
                alternatives: finding.alternatives,
            },
        }
    }

    /// Rules with morning/evening guidance stay quiet when the routine
    /// already schedules them that way, if the caller opted in.
    fn honors_slot_guidance(&self, finding: &PairFinding, resolved: &ResolvedRoutine) -> bool {
        if !self.settings.suppress_honored_slot_rules || finding.kind != FindingKind::KnownConflict
        {
            return false;
        }
        let [a, b] = &finding.ingredients;
        let Some((_, rule)) = self.knowledge.rule_for(a, b) else {
            return false;
        };
        let Some(guidance) = &rule.slot_guidance else {
            return false;
        };

        resolved.only_in(&guidance.morning, TimeOfDay::Morning)
            && resolved.only_in(&guidance.evening, TimeOfDay::Evening)
    }

    fn multiple_actives(
        &self,
        slot: TimeOfDay,
        actives: BTreeSet<IngredientId>,
        resolved: &ResolvedRoutine,
    ) -> RankedFinding {
        let mut ingredients = actives.into_iter().collect::<Vec<_>>();
        ingredients.sort_by_key(|id| self.knowledge.position(id).unwrap_or(usize::MAX));
        let names =
            ingredients.iter().map(|id| display_name(self.knowledge, id)).collect::<Vec<_>>();

        RankedFinding {
            rank: HEURISTIC_RANK,
            positions: self.positions(&ingredients),
            finding: ConflictFinding {
                kind: FindingKind::MultipleActives,
                severity: Severity::High,
                products: resolved.sources(&ingredients, Some(slot)),
                ingredients,
                slot: Some(slot),
                issue: format!("Multiple actives in the {slot} routine: {}", names.join(", ")),
                recommendation: format!(
                    "Keep one active per {slot} routine; use {} on alternate days",
                    join_names(&names)
                ),
                can_alternate: true,
                required_gap_minutes: None,
                alternatives: Vec::new(),
            },
        }
    }

    fn wrong_time_of_day(
        &self,
        ids: &[IngredientId],
        resolved: &ResolvedRoutine,
    ) -> Vec<RankedFinding> {
        ids.iter()
            .filter(|id| {
                resolved
                    .occurrences
                    .get(*id)
                    .is_some_and(|occurrence| occurrence.slots.contains(&TimeOfDay::Morning))
            })
            .filter_map(|id| self.knowledge.ingredient(id))
            .filter(|ingredient| ingredient.photosensitizing)
            .map(|ingredient| {
                let ingredients = vec![ingredient.id.clone()];
                RankedFinding {
                    rank: HEURISTIC_RANK,
                    positions: self.positions(&ingredients),
                    finding: ConflictFinding {
                        kind: FindingKind::WrongTimeOfDay,
                        severity: Severity::Medium,
                        products: resolved.sources(&ingredients, Some(TimeOfDay::Morning)),
                        ingredients,
                        slot: Some(TimeOfDay::Morning),
                        issue: format!(
                            "Wrong time of day: {} increases sun sensitivity but is applied in the morning",
                            ingredient.display_name
                        ),
                        recommendation: format!(
                            "Move {} to your evening routine and wear SPF 30+ during the day",
                            ingredient.display_name
                        ),
                        can_alternate: false,
                        required_gap_minutes: None,
                        alternatives: Vec::new(),
                    },
                }
            })
            .collect()
    }

    fn synergies(&self, ids: &[IngredientId]) -> Vec<SynergyNote> {
        let mut notes = Vec::new();
        for (index, a) in ids.iter().enumerate() {
            let Some(ingredient) = self.knowledge.ingredient(a) else {
                continue;
            };
            for b in ids[index + 1..].iter().filter(|b| ingredient.synergizes_with.contains(*b)) {
                notes.push(SynergyNote {
                    ingredients: [a.clone(), b.clone()],
                    note: format!(
                        "{} and {} work well together",
                        ingredient.display_name,
                        display_name(self.knowledge, b)
                    ),
                });
            }
        }
        notes
    }
}

/// Severity descending, then rule declaration order (heuristics last), then
/// ingredient declaration order. Duplicates by (kind, ingredients, slot) are
/// dropped, keeping the first.
fn order_and_dedupe(mut ranked: Vec<RankedFinding>) -> Vec<ConflictFinding> {
    ranked.sort_by(|left, right| {
        let key = |entry: &RankedFinding| {
            (
                Reverse(entry.finding.severity),
                entry.rank,
                entry.positions.clone(),
                entry.finding.kind,
                entry.finding.slot,
            )
        };
        key(left).cmp(&key(right))
    });

    let mut seen = BTreeSet::new();
    ranked
        .into_iter()
        .filter(|entry| {
            let mut ingredients = entry.finding.ingredients.clone();
            ingredients.sort();
            seen.insert((entry.finding.kind, ingredients, entry.finding.slot))
        })
        .map(|entry| entry.finding)
        .collect()
}
