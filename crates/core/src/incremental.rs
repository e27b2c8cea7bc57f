use crate::analyzer::{display_name, RoutineAnalyzer};
use crate::domain::finding::{AdditionReport, ConflictFinding};
use crate::domain::ingredient::IngredientId;
use crate::domain::routine::{ProductInput, Routine};
use crate::domain::rule::Severity;
use crate::knowledge::KnowledgeBase;
use crate::resolver::ConflictResolver;

/// Checks one candidate product against an existing routine by analyzing the
/// combined routine and keeping only the findings the candidate takes part in.
pub struct IncrementalChecker<'a, 'r, R> {
    knowledge: &'a KnowledgeBase,
    analyzer: &'r RoutineAnalyzer<'a, R>,
}

impl<'a, 'r, R: ConflictResolver> IncrementalChecker<'a, 'r, R> {
    pub fn new(knowledge: &'a KnowledgeBase, analyzer: &'r RoutineAnalyzer<'a, R>) -> Self {
        Self { knowledge, analyzer }
    }

    pub fn check_addition(&self, new_product: &ProductInput, existing: &Routine) -> AdditionReport {
        let added_name = existing.addition_name(new_product);
        let combined = existing.with_addition(new_product);
        let analysis = self.analyzer.analyze(&combined);

        let mut new_ids = Vec::new();
        for id in new_product.ingredients.iter().filter_map(|raw| self.knowledge.resolve(raw)) {
            if !new_ids.contains(&id) {
                new_ids.push(id);
            }
        }

        let conflicts = analysis
            .findings
            .into_iter()
            .filter(|finding| touches_addition(finding, &added_name, &new_ids))
            .collect::<Vec<_>>();

        let safe = conflicts.iter().all(|finding| finding.severity < Severity::High);
        let suggestions = self.suggestions(new_product, &conflicts);

        AdditionReport { safe, conflicts, suggestions }
    }

    fn suggestions(&self, new_product: &ProductInput, conflicts: &[ConflictFinding]) -> Vec<String> {
        if conflicts.is_empty() {
            return vec![format!(
                "{} has no known conflicts with your current routine.",
                new_product.name
            )];
        }

        let mut suggestions = Vec::new();
        for finding in conflicts {
            push_unique(&mut suggestions, finding.recommendation.clone());
        }
        for finding in conflicts {
            for alternative in &finding.alternatives {
                push_unique(
                    &mut suggestions,
                    format!(
                        "Consider {} as a gentler alternative.",
                        display_name(self.knowledge, alternative)
                    ),
                );
            }
        }
        suggestions
    }
}

fn touches_addition(finding: &ConflictFinding, product_name: &str, ids: &[IngredientId]) -> bool {
    finding.touches_product(product_name) || ids.iter().any(|id| finding.involves(id))
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}
