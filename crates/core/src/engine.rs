use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analyzer::RoutineAnalyzer;
use crate::config::AppConfig;
use crate::domain::finding::{AdditionReport, AnalysisResult, ConflictFinding, OptimizedRoutine};
use crate::domain::ingredient::IngredientId;
use crate::domain::profile::{PersonalizationReport, UserProfile};
use crate::domain::routine::{ProductInput, Routine};
use crate::errors::{ApplicationError, DomainError};
use crate::incremental::IncrementalChecker;
use crate::knowledge::{KnowledgeBase, KnowledgeBaseSwitch};
use crate::normalizer::Resolution;
use crate::optimizer::RoutineOptimizer;
use crate::personalization::Personalizer;
use crate::resolver::{ConflictResolver, DeterministicConflictResolver, PairContext, PairFinding};

/// Tunables shared by the analysis components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub ph_gap_threshold: Decimal,
    pub suppress_honored_slot_rules: bool,
    pub max_passes: u32,
    pub max_notes: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ph_gap_threshold: Decimal::from(3),
            suppress_honored_slot_rules: false,
            max_passes: 4,
            max_notes: 5,
        }
    }
}

pub trait RoutineSafetyEngine: Send + Sync {
    fn analyze(&self, routine: &Routine) -> AnalysisResult;
    fn optimize(&self, routine: &Routine, findings: &[ConflictFinding]) -> OptimizedRoutine;
    fn check_addition(&self, new_product: &ProductInput, existing: &Routine) -> AdditionReport;
    fn personalize(&self, profile: &UserProfile, product: &ProductInput) -> PersonalizationReport;
}

/// Wires the resolver, analyzer, optimizer, incremental checker and
/// personalization overlay over one refreshable knowledge base. Each call
/// loads the current table once, so a concurrent swap never splits a call
/// across two datasets.
pub struct DeterministicSafetyEngine {
    knowledge: KnowledgeBaseSwitch,
    settings: EngineSettings,
}

impl DeterministicSafetyEngine {
    pub fn new(knowledge: Arc<KnowledgeBase>, settings: EngineSettings) -> Self {
        Self { knowledge: KnowledgeBaseSwitch::new(knowledge), settings }
    }

    pub fn builtin() -> Result<Self, DomainError> {
        Ok(Self::new(Arc::new(KnowledgeBase::builtin()?), EngineSettings::default()))
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApplicationError> {
        let knowledge = KnowledgeBase::from_config(&config.knowledge_base)?;
        tracing::info!(
            event_name = "engine.knowledge.loaded",
            version = %knowledge.version(),
            ingredients = knowledge.ingredients().len(),
            rules = knowledge.rules().len(),
            "knowledge base ready"
        );
        Ok(Self::new(Arc::new(knowledge), config.engine_settings()))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn knowledge(&self) -> Arc<KnowledgeBase> {
        self.knowledge.current()
    }

    pub fn knowledge_switch(&self) -> &KnowledgeBaseSwitch {
        &self.knowledge
    }

    pub fn resolve(&self, raw: &str) -> Option<Resolution> {
        self.knowledge.current().resolve_detailed(raw)
    }

    pub fn check_pair(
        &self,
        a: &IngredientId,
        b: &IngredientId,
        context: &PairContext,
    ) -> Vec<PairFinding> {
        let knowledge = self.knowledge.current();
        DeterministicConflictResolver::new(&knowledge, self.settings.ph_gap_threshold)
            .check_pair(a, b, context)
    }
}

impl RoutineSafetyEngine for DeterministicSafetyEngine {
    fn analyze(&self, routine: &Routine) -> AnalysisResult {
        let knowledge = self.knowledge.current();
        let result = RoutineAnalyzer::deterministic(&knowledge, self.settings.clone()).analyze(routine);

        tracing::debug!(
            event_name = "engine.analyze.completed",
            knowledge_version = %knowledge.version(),
            findings = result.findings.len(),
            safety_score = result.safety_score,
            unresolved = result.unresolved_ingredients().count(),
            "routine analyzed"
        );
        result
    }

    fn optimize(&self, routine: &Routine, findings: &[ConflictFinding]) -> OptimizedRoutine {
        let knowledge = self.knowledge.current();
        let optimized =
            RoutineOptimizer::new(&knowledge, self.settings.max_passes).optimize(routine, findings);

        tracing::debug!(
            event_name = "engine.optimize.completed",
            knowledge_version = %knowledge.version(),
            warnings = optimized.warnings.len(),
            "routine optimized"
        );
        optimized
    }

    fn check_addition(&self, new_product: &ProductInput, existing: &Routine) -> AdditionReport {
        let knowledge = self.knowledge.current();
        let analyzer = RoutineAnalyzer::deterministic(&knowledge, self.settings.clone());
        let report = IncrementalChecker::new(&knowledge, &analyzer).check_addition(new_product, existing);

        tracing::debug!(
            event_name = "engine.check_addition.completed",
            product = %new_product.name,
            conflicts = report.conflicts.len(),
            safe = report.safe,
            "addition checked"
        );
        report
    }

    fn personalize(&self, profile: &UserProfile, product: &ProductInput) -> PersonalizationReport {
        let knowledge = self.knowledge.current();
        let report = Personalizer::new(&knowledge, self.settings.max_notes).personalize(profile, product);

        tracing::debug!(
            event_name = "engine.personalize.completed",
            product = %product.name,
            warnings = report.warnings.len(),
            benefit_notes = report.benefit_notes.len(),
            "product personalized"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DeterministicSafetyEngine, EngineSettings, RoutineSafetyEngine};
    use crate::domain::ingredient::{Ingredient, IngredientCategory};
    use crate::domain::routine::Routine;
    use crate::domain::rule::{ConflictRule, Severity};
    use crate::knowledge::KnowledgeBase;

    fn knowledge(severity: Severity) -> KnowledgeBase {
        KnowledgeBase::builder()
            .version(format!("fixture-{severity}"))
            .ingredient(Ingredient::new("alpha", "Alpha", IngredientCategory::Active))
            .ingredient(Ingredient::new("beta", "Beta", IngredientCategory::Humectant))
            .rule(ConflictRule::new("alpha", "beta", severity, "clash", "separate"))
            .build()
            .expect("fixture knowledge base")
    }

    #[test]
    fn engine_uses_injected_reference_data() {
        let engine =
            DeterministicSafetyEngine::new(Arc::new(knowledge(Severity::Low)), EngineSettings::default());

        let result = engine.analyze(&Routine::new(["alpha"], ["beta"]));

        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.safety_score, 95);
    }

    #[test]
    fn swapped_knowledge_applies_to_the_next_call() {
        let engine =
            DeterministicSafetyEngine::new(Arc::new(knowledge(Severity::Low)), EngineSettings::default());
        let routine = Routine::new(["alpha"], ["beta"]);

        engine.knowledge_switch().swap(Arc::new(knowledge(Severity::Dangerous)));
        assert_eq!(engine.analyze(&routine).safety_score, 60);

        engine.knowledge_switch().rollback();
        assert_eq!(engine.analyze(&routine).safety_score, 95);
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeterministicSafetyEngine>();
    }
}
