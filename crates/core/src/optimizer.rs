use crate::analyzer::{display_name, expand_entry, join_names};
use crate::domain::finding::{ConflictFinding, FindingKind, OptimizedRoutine};
use crate::domain::ingredient::IngredientId;
use crate::domain::routine::{Routine, TimeOfDay};
use crate::domain::rule::Severity;
use crate::knowledge::KnowledgeBase;

/// Greedy slot rewrite. Photosensitizing entries move out of the morning,
/// repeated until nothing moves or `max_passes` is reached; everything else
/// is reported as a warning without touching the schedule.
pub struct RoutineOptimizer<'a> {
    knowledge: &'a KnowledgeBase,
    max_passes: u32,
}

impl<'a> RoutineOptimizer<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, max_passes: u32) -> Self {
        Self { knowledge, max_passes: max_passes.max(1) }
    }

    pub fn optimize(&self, routine: &Routine, findings: &[ConflictFinding]) -> OptimizedRoutine {
        let mut optimized = OptimizedRoutine {
            morning: routine.morning.clone(),
            evening: routine.evening.clone(),
            warnings: Vec::new(),
        };
        schedule_slotted_products(routine, &mut optimized);

        let mut passes = 0;
        while passes < self.max_passes {
            passes += 1;
            if !self.relocate_photosensitizers(routine, &mut optimized) {
                break;
            }
        }

        for slot in TimeOfDay::ALL {
            self.warn_on_stacked_actives(routine, slot, &mut optimized);
        }
        for finding in findings.iter().filter(|finding| finding.kind == FindingKind::KnownConflict) {
            self.warn_on_rule(routine, finding, &mut optimized);
        }

        tracing::debug!(
            event_name = "optimizer.completed",
            passes,
            warnings = optimized.warnings.len(),
            "routine optimized"
        );
        optimized
    }

    fn relocate_photosensitizers(&self, routine: &Routine, optimized: &mut OptimizedRoutine) -> bool {
        let mut kept = Vec::with_capacity(optimized.morning.len());
        let mut moved = false;

        for entry in std::mem::take(&mut optimized.morning) {
            let sensitizers = expand_entry(self.knowledge, routine, &entry)
                .into_iter()
                .filter(|id| {
                    self.knowledge.ingredient(id).is_some_and(|ingredient| ingredient.photosensitizing)
                })
                .map(|id| display_name(self.knowledge, &id))
                .collect::<Vec<_>>();

            if sensitizers.is_empty() {
                kept.push(entry);
                continue;
            }

            moved = true;
            let verb = if sensitizers.len() == 1 { "increases" } else { "increase" };
            push_unique(
                &mut optimized.warnings,
                format!(
                    "Moved {entry} from morning to evening: {} {verb} sun sensitivity. Wear SPF 30+ during the day.",
                    join_names(&sensitizers)
                ),
            );
            if !optimized.evening.iter().any(|existing| same_entry(existing, &entry)) {
                optimized.evening.push(entry);
            }
        }

        optimized.morning = kept;
        moved
    }

    fn slot_ids(&self, routine: &Routine, entries: &[String]) -> Vec<IngredientId> {
        let mut ids = Vec::new();
        for id in entries.iter().flat_map(|entry| expand_entry(self.knowledge, routine, entry)) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids.sort_by_key(|id| self.knowledge.position(id).unwrap_or(usize::MAX));
        ids
    }

    fn warn_on_stacked_actives(
        &self,
        routine: &Routine,
        slot: TimeOfDay,
        optimized: &mut OptimizedRoutine,
    ) {
        let entries = match slot {
            TimeOfDay::Morning => &optimized.morning,
            TimeOfDay::Evening => &optimized.evening,
        };
        let actives = self
            .slot_ids(routine, entries)
            .into_iter()
            .filter(|id| self.knowledge.ingredient(id).is_some_and(|ingredient| ingredient.is_active()))
            .map(|id| display_name(self.knowledge, &id))
            .collect::<Vec<_>>();

        if actives.len() > 1 {
            push_unique(
                &mut optimized.warnings,
                format!(
                    "The {slot} routine still combines {} actives ({}); use them on alternate days instead of together.",
                    actives.len(),
                    join_names(&actives)
                ),
            );
        }
    }

    fn warn_on_rule(&self, routine: &Routine, finding: &ConflictFinding, optimized: &mut OptimizedRoutine) {
        let [a, b] = match finding.ingredients.as_slice() {
            [a, b] => [a, b],
            _ => return,
        };
        let names = [display_name(self.knowledge, a), display_name(self.knowledge, b)];

        if let Some(minutes) = finding.required_gap_minutes {
            for slot in TimeOfDay::ALL {
                let entries = match slot {
                    TimeOfDay::Morning => &optimized.morning,
                    TimeOfDay::Evening => &optimized.evening,
                };
                let ids = self.slot_ids(routine, entries);
                if ids.contains(a) && ids.contains(b) {
                    push_unique(
                        &mut optimized.warnings,
                        format!(
                            "Wait at least {minutes} minutes between {} and {} in the {slot} routine.",
                            names[0], names[1]
                        ),
                    );
                }
            }
        }

        if finding.can_alternate && finding.severity >= Severity::High {
            push_unique(
                &mut optimized.warnings,
                format!("Consider using {} and {} on alternate days.", names[0], names[1]),
            );
        }
    }
}

/// Products no entry names but which carry a slot are analyzed in that slot,
/// so the rewrite lists them there too.
fn schedule_slotted_products(routine: &Routine, optimized: &mut OptimizedRoutine) {
    for product in routine.unscheduled_products() {
        if product.name.trim().is_empty() {
            continue;
        }
        let entries = match product.slot {
            Some(TimeOfDay::Morning) => &mut optimized.morning,
            Some(TimeOfDay::Evening) => &mut optimized.evening,
            None => continue,
        };
        if !entries.iter().any(|entry| same_entry(entry, &product.name)) {
            entries.push(product.name.clone());
        }
    }
}

fn same_entry(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn push_unique(warnings: &mut Vec<String>, warning: String) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
