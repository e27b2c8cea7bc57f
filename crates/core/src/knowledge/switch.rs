use std::sync::Arc;

use arc_swap::ArcSwap;

use super::KnowledgeBase;

/// Holds the active knowledge base behind an atomically swapped pointer plus
/// the last-known-good snapshot it replaced. Readers clone the `Arc` and keep
/// a consistent table for the whole call.
pub struct KnowledgeBaseSwitch {
    current: ArcSwap<KnowledgeBase>,
    last_known_good: ArcSwap<KnowledgeBase>,
}

impl KnowledgeBaseSwitch {
    pub fn new(initial: Arc<KnowledgeBase>) -> Self {
        Self {
            current: ArcSwap::from(initial.clone()),
            last_known_good: ArcSwap::from(initial),
        }
    }

    pub fn current(&self) -> Arc<KnowledgeBase> {
        self.current.load_full()
    }

    pub fn swap(&self, next: Arc<KnowledgeBase>) {
        let version = next.version().to_string();
        let previous = self.current.swap(next);
        tracing::info!(
            event_name = "knowledge.switch.swapped",
            previous_version = %previous.version(),
            version = %version,
            "active knowledge base replaced"
        );
        self.last_known_good.store(previous);
    }

    /// Builds a replacement off to the side and only swaps it in on success.
    pub fn refresh<F, E>(&self, build: F) -> Result<Arc<KnowledgeBase>, E>
    where
        F: FnOnce() -> Result<KnowledgeBase, E>,
        E: std::fmt::Display,
    {
        match build() {
            Ok(next) => {
                let next = Arc::new(next);
                self.swap(next.clone());
                Ok(next)
            }
            Err(error) => {
                tracing::warn!(
                    event_name = "knowledge.switch.refresh_rejected",
                    version = %self.current.load().version(),
                    error = %error,
                    "knowledge base refresh failed; keeping active table"
                );
                Err(error)
            }
        }
    }

    pub fn rollback(&self) -> Arc<KnowledgeBase> {
        let snapshot = self.last_known_good.load_full();
        self.current.store(snapshot.clone());
        tracing::info!(
            event_name = "knowledge.switch.rolled_back",
            version = %snapshot.version(),
            "knowledge base rolled back"
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::KnowledgeBaseSwitch;
    use crate::domain::ingredient::{Ingredient, IngredientCategory};
    use crate::errors::DomainError;
    use crate::knowledge::KnowledgeBase;

    fn knowledge(version: &str) -> KnowledgeBase {
        KnowledgeBase::builder()
            .version(version)
            .ingredient(Ingredient::new("alpha", "Alpha", IngredientCategory::Active))
            .build()
            .expect("fixture knowledge base")
    }

    #[test]
    fn swap_keeps_previous_as_rollback_target() {
        let switch = KnowledgeBaseSwitch::new(Arc::new(knowledge("v1")));
        let held = switch.current();

        switch.swap(Arc::new(knowledge("v2")));
        assert_eq!(switch.current().version(), "v2");
        assert_eq!(held.version(), "v1", "readers keep the table they loaded");

        let restored = switch.rollback();
        assert_eq!(restored.version(), "v1");
        assert_eq!(switch.current().version(), "v1");
    }

    #[test]
    fn failed_refresh_leaves_active_table_untouched() {
        let switch = KnowledgeBaseSwitch::new(Arc::new(knowledge("v1")));

        let result = switch.refresh(|| {
            KnowledgeBase::builder()
                .ingredient(Ingredient::new("", "Nameless", IngredientCategory::Other))
                .build()
        });

        assert_eq!(result.err(), Some(DomainError::EmptyIngredientId));
        assert_eq!(switch.current().version(), "v1");
    }
}
