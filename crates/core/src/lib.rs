pub mod analyzer;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod incremental;
pub mod knowledge;
pub mod normalizer;
pub mod optimizer;
pub mod personalization;
pub mod resolver;

pub use analyzer::RoutineAnalyzer;
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::finding::{
    AdditionReport, AnalysisResult, ConflictFinding, FindingKind, IngredientMention,
    OptimizedRoutine, SynergyNote,
};
pub use domain::ingredient::{Ingredient, IngredientCategory, IngredientId, SkinType};
pub use domain::profile::{PersonalizationReport, UserProfile};
pub use domain::routine::{ProductInput, Routine, TimeOfDay};
pub use domain::rule::{ConflictRule, PairKey, Severity};
pub use engine::{DeterministicSafetyEngine, EngineSettings, RoutineSafetyEngine};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use incremental::IncrementalChecker;
pub use knowledge::{KnowledgeBase, KnowledgeBaseBuilder, KnowledgeBaseSwitch, RulePack};
pub use normalizer::{normalize_name, MatchTier, Resolution};
pub use optimizer::RoutineOptimizer;
pub use personalization::Personalizer;
pub use resolver::{ConflictResolver, DeterministicConflictResolver, PairContext, PairFinding};
