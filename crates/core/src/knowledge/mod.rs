//! Immutable ingredient reference data.
//!
//! A [`KnowledgeBase`] is assembled once through [`KnowledgeBaseBuilder`],
//! validated, and then only read. Engines receive it by reference (or through
//! a [`KnowledgeBaseSwitch`] when it must be refreshed at runtime), so tests
//! can inject fixture rule sets and concurrent callers share one table.

mod builtin;
mod keywords;
mod rule_pack;
mod switch;

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::config::KnowledgeBaseConfig;
use crate::domain::ingredient::{Ingredient, IngredientId, SkinType};
use crate::domain::rule::{ConflictRule, PairKey};
use crate::errors::{ApplicationError, DomainError};
use crate::normalizer::{NormalizationTable, Resolution};

pub use builtin::BUILTIN_VERSION;
pub(crate) use keywords::fold_key;
pub use keywords::{ConcernKeywordRow, KeywordNote, KeywordTables, SkinTypeKeywordRow};
pub use rule_pack::RulePack;
pub use switch::KnowledgeBaseSwitch;

const MAX_COMEDOGENIC_RATING: u8 = 5;

#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    version: String,
    ingredients: Vec<Ingredient>,
    positions: HashMap<IngredientId, usize>,
    rules: Vec<ConflictRule>,
    rule_positions: HashMap<PairKey, usize>,
    normalization: NormalizationTable,
    keywords: KeywordTables,
}

impl KnowledgeBase {
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    /// The reference dataset shipped with the crate.
    pub fn builtin() -> Result<Self, DomainError> {
        builtin::builder().build()
    }

    pub fn from_rule_pack_str(raw: &str) -> Result<Self, ApplicationError> {
        let pack = RulePack::from_toml_str(raw)?;
        Ok(Self::builder().extend_from_rule_pack(pack).build()?)
    }

    pub fn from_config(config: &KnowledgeBaseConfig) -> Result<Self, ApplicationError> {
        let mut builder =
            if config.include_builtin { builtin::builder() } else { KnowledgeBaseBuilder::default() };

        if let Some(path) = config.rule_pack_path.as_deref() {
            let pack = RulePack::load(path)?;
            if pack.is_empty() {
                tracing::warn!(
                    event_name = "knowledge.rule_pack.empty",
                    path = %path.display(),
                    "rule pack contributes no data"
                );
            }
            tracing::debug!(
                event_name = "knowledge.rule_pack.loaded",
                path = %path.display(),
                ingredients = pack.ingredients.len(),
                rules = pack.rules.len(),
                "rule pack parsed"
            );
            builder = builder.extend_from_rule_pack(pack);
        }

        Ok(builder.build()?)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn ingredient(&self, id: &IngredientId) -> Option<&Ingredient> {
        self.positions.get(id).map(|position| &self.ingredients[*position])
    }

    /// Declaration index of an ingredient, used as a deterministic tiebreak.
    pub fn position(&self, id: &IngredientId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn rules(&self) -> &[ConflictRule] {
        &self.rules
    }

    /// Symmetric rule lookup returning the rule and its declaration index.
    pub fn rule_for(&self, a: &IngredientId, b: &IngredientId) -> Option<(usize, &ConflictRule)> {
        let key = PairKey::new(a.clone(), b.clone());
        self.rule_positions.get(&key).map(|position| (*position, &self.rules[*position]))
    }

    pub fn rules_involving<'a>(
        &'a self,
        id: &'a IngredientId,
    ) -> impl Iterator<Item = &'a ConflictRule> + 'a {
        self.rules.iter().filter(move |rule| rule.pair.contains(id))
    }

    pub fn resolve(&self, raw: &str) -> Option<IngredientId> {
        self.normalization.resolve(raw).map(|resolution| resolution.id)
    }

    pub fn resolve_detailed(&self, raw: &str) -> Option<Resolution> {
        self.normalization.resolve(raw)
    }

    pub fn keywords(&self) -> &KeywordTables {
        &self.keywords
    }
}

#[derive(Clone, Debug, Default)]
pub struct KnowledgeBaseBuilder {
    version: Option<String>,
    ingredients: Vec<Ingredient>,
    rules: Vec<ConflictRule>,
    keywords: KeywordTables,
}

impl KnowledgeBaseBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    pub fn rule(mut self, rule: ConflictRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn caution(mut self, skin_type: SkinType, keyword: &str, note: &str) -> Self {
        self.keywords.add_caution(skin_type, keyword, note);
        self
    }

    pub fn benefit(mut self, skin_type: SkinType, keyword: &str, note: &str) -> Self {
        self.keywords.add_benefit(skin_type, keyword, note);
        self
    }

    pub fn concern_note(mut self, concern: &str, keyword: &str, note: &str) -> Self {
        self.keywords.add_concern_note(concern, keyword, note);
        self
    }

    /// Layers a rule pack over the data collected so far. Ingredients and rules
    /// whose id or pair already exists replace the earlier entry in place, so
    /// declaration order is kept stable.
    pub fn extend_from_rule_pack(mut self, pack: RulePack) -> Self {
        if let Some(version) = pack.version {
            self.version = Some(match self.version.take() {
                Some(base) => format!("{base}+{version}"),
                None => version,
            });
        }

        for ingredient in pack.ingredients {
            match self.ingredients.iter_mut().find(|existing| existing.id == ingredient.id) {
                Some(existing) => *existing = ingredient,
                None => self.ingredients.push(ingredient),
            }
        }

        for rule in pack.rules {
            match self.rules.iter_mut().find(|existing| existing.pair == rule.pair) {
                Some(existing) => *existing = rule,
                None => self.rules.push(rule),
            }
        }

        for row in pack.cautions {
            self.keywords.add_caution(row.skin_type, &row.keyword, &row.note);
        }
        for row in pack.benefits {
            self.keywords.add_benefit(row.skin_type, &row.keyword, &row.note);
        }
        for row in pack.concern_notes {
            self.keywords.add_concern_note(&row.concern, &row.keyword, &row.note);
        }

        self
    }

    pub fn build(self) -> Result<KnowledgeBase, DomainError> {
        let mut ingredients = self.ingredients;
        let mut positions = HashMap::with_capacity(ingredients.len());

        for (position, ingredient) in ingredients.iter().enumerate() {
            validate_ingredient(ingredient)?;
            if positions.insert(ingredient.id.clone(), position).is_some() {
                return Err(DomainError::DuplicateIngredient(ingredient.id.clone()));
            }
        }

        for ingredient in &ingredients {
            let references = ingredient.conflicts_with.iter().chain(&ingredient.synergizes_with);
            for reference in references {
                if !positions.contains_key(reference) {
                    return Err(DomainError::UnknownReference {
                        ingredient: ingredient.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        let mut rule_positions = HashMap::with_capacity(self.rules.len());
        for (position, rule) in self.rules.iter().enumerate() {
            validate_rule(rule, &positions)?;
            if rule_positions.insert(rule.pair.clone(), position).is_some() {
                return Err(DomainError::DuplicateRule(rule.pair.clone()));
            }
        }

        // Conflict and synergy links are symmetric even when only one side
        // declares them.
        let mut conflict_links: Vec<BTreeSet<IngredientId>> =
            ingredients.iter().map(|ingredient| ingredient.conflicts_with.clone()).collect();
        let mut synergy_links: Vec<BTreeSet<IngredientId>> =
            ingredients.iter().map(|ingredient| ingredient.synergizes_with.clone()).collect();

        for rule in &self.rules {
            let first = positions[rule.pair.first()];
            let second = positions[rule.pair.second()];
            conflict_links[first].insert(rule.pair.second().clone());
            conflict_links[second].insert(rule.pair.first().clone());
        }
        for ingredient in &ingredients {
            for (target, links) in [
                (&ingredient.conflicts_with, &mut conflict_links),
                (&ingredient.synergizes_with, &mut synergy_links),
            ] {
                for reference in target {
                    links[positions[reference]].insert(ingredient.id.clone());
                }
            }
        }

        for (ingredient, (conflicts, synergies)) in
            ingredients.iter_mut().zip(conflict_links.into_iter().zip(synergy_links))
        {
            ingredient.conflicts_with = conflicts;
            ingredient.synergizes_with = synergies;
        }

        let normalization = NormalizationTable::build(&ingredients);
        let version = self.version.unwrap_or_else(|| "custom".to_string());

        tracing::debug!(
            event_name = "knowledge.build.completed",
            version = %version,
            ingredients = ingredients.len(),
            rules = self.rules.len(),
            keyword_rows = self.keywords.len(),
            "knowledge base built"
        );

        Ok(KnowledgeBase {
            version,
            ingredients,
            positions,
            rules: self.rules,
            rule_positions,
            normalization,
            keywords: self.keywords,
        })
    }
}

fn validate_ingredient(ingredient: &Ingredient) -> Result<(), DomainError> {
    if ingredient.id.as_str().trim().is_empty() {
        return Err(DomainError::EmptyIngredientId);
    }

    let invalid = |field: &'static str, detail: String| DomainError::InvalidIngredient {
        ingredient: ingredient.id.clone(),
        field,
        detail,
    };

    if ingredient.comedogenic_rating > MAX_COMEDOGENIC_RATING {
        return Err(invalid(
            "comedogenic_rating",
            format!("{} is outside 0..={MAX_COMEDOGENIC_RATING}", ingredient.comedogenic_rating),
        ));
    }

    if let Some(range) = ingredient.ph_range {
        if !range.is_valid() {
            return Err(invalid(
                "ph_range",
                format!("{}..{} must be ordered and within 0..=14", range.min, range.max),
            ));
        }
    }

    if let Some(range) = ingredient.concentration {
        if !range.is_valid() {
            return Err(invalid(
                "concentration",
                format!("{}..{} must be ordered and within 0..=100", range.min_pct, range.max_pct),
            ));
        }
        if range.max_pct == Decimal::ZERO {
            return Err(invalid("concentration", "maximum must be above zero".to_string()));
        }
    }

    if ingredient.conflicts_with.contains(&ingredient.id)
        || ingredient.synergizes_with.contains(&ingredient.id)
    {
        return Err(DomainError::SelfConflict(ingredient.id.clone()));
    }

    Ok(())
}

fn validate_rule(
    rule: &ConflictRule,
    positions: &HashMap<IngredientId, usize>,
) -> Result<(), DomainError> {
    if rule.pair.is_self_pair() {
        return Err(DomainError::SelfConflict(rule.pair.first().clone()));
    }

    for member in [rule.pair.first(), rule.pair.second()].into_iter().chain(&rule.alternatives) {
        if !positions.contains_key(member) {
            return Err(DomainError::UnknownRuleIngredient {
                pair: rule.pair.clone(),
                ingredient: member.clone(),
            });
        }
    }

    if let Some(guidance) = &rule.slot_guidance {
        for assigned in [&guidance.morning, &guidance.evening] {
            if !rule.pair.contains(assigned) {
                return Err(DomainError::InvalidSlotGuidance {
                    pair: rule.pair.clone(),
                    ingredient: assigned.clone(),
                });
            }
        }
        if guidance.morning == guidance.evening {
            return Err(DomainError::InvalidSlotGuidance {
                pair: rule.pair.clone(),
                ingredient: guidance.morning.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::KnowledgeBase;
    use crate::domain::ingredient::{Ingredient, IngredientCategory, IngredientId};
    use crate::domain::rule::{ConflictRule, Severity};
    use crate::errors::DomainError;

    fn fixture() -> KnowledgeBase {
        KnowledgeBase::builder()
            .version("fixture-1")
            .ingredient(Ingredient::new("alpha", "Alpha", IngredientCategory::Active))
            .ingredient(
                Ingredient::new("beta", "Beta", IngredientCategory::Humectant)
                    .synergizes_with(["alpha"]),
            )
            .ingredient(Ingredient::new("gamma", "Gamma", IngredientCategory::Active))
            .rule(ConflictRule::new("gamma", "alpha", Severity::High, "oxidizes", "separate them"))
            .build()
            .expect("fixture knowledge base")
    }

    #[test]
    fn builtin_dataset_passes_validation() {
        let knowledge = KnowledgeBase::builtin().expect("builtin knowledge base");
        assert!(knowledge.ingredients().len() >= 20);
        assert!(!knowledge.rules().is_empty());
        assert!(!knowledge.keywords().is_empty());
    }

    #[test]
    fn rule_lookup_is_symmetric() {
        let knowledge = fixture();
        let alpha = IngredientId::new("alpha");
        let gamma = IngredientId::new("gamma");

        let forward = knowledge.rule_for(&alpha, &gamma).map(|(position, _)| position);
        let reverse = knowledge.rule_for(&gamma, &alpha).map(|(position, _)| position);
        assert_eq!(forward, Some(0));
        assert_eq!(forward, reverse);
        assert!(knowledge.rule_for(&alpha, &IngredientId::new("beta")).is_none());
    }

    #[test]
    fn links_are_mirrored_onto_both_ingredients() {
        let knowledge = fixture();
        let alpha = knowledge.ingredient(&IngredientId::new("alpha")).expect("alpha");

        assert!(alpha.conflicts_with.contains(&IngredientId::new("gamma")));
        assert!(alpha.synergizes_with.contains(&IngredientId::new("beta")));
    }

    #[test]
    fn build_rejects_inconsistent_reference_data() {
        let duplicate = KnowledgeBase::builder()
            .ingredient(Ingredient::new("alpha", "Alpha", IngredientCategory::Active))
            .ingredient(Ingredient::new("alpha", "Alpha again", IngredientCategory::Active))
            .build();
        assert!(matches!(duplicate, Err(DomainError::DuplicateIngredient(_))));

        let unknown = KnowledgeBase::builder()
            .ingredient(Ingredient::new("alpha", "Alpha", IngredientCategory::Active))
            .rule(ConflictRule::new("alpha", "omega", Severity::Low, "", ""))
            .build();
        assert!(matches!(unknown, Err(DomainError::UnknownRuleIngredient { .. })));

        let duplicate_pair = KnowledgeBase::builder()
            .ingredient(Ingredient::new("alpha", "Alpha", IngredientCategory::Active))
            .ingredient(Ingredient::new("beta", "Beta", IngredientCategory::Active))
            .rule(ConflictRule::new("alpha", "beta", Severity::Low, "", ""))
            .rule(ConflictRule::new("beta", "alpha", Severity::High, "", ""))
            .build();
        assert!(matches!(duplicate_pair, Err(DomainError::DuplicateRule(_))));

        let inverted_ph = KnowledgeBase::builder()
            .ingredient(
                Ingredient::new("alpha", "Alpha", IngredientCategory::Active)
                    .with_ph(Decimal::from(7), Decimal::from(3)),
            )
            .build();
        assert!(matches!(
            inverted_ph,
            Err(DomainError::InvalidIngredient { field: "ph_range", .. })
        ));

        let bad_guidance = KnowledgeBase::builder()
            .ingredient(Ingredient::new("alpha", "Alpha", IngredientCategory::Active))
            .ingredient(Ingredient::new("beta", "Beta", IngredientCategory::Active))
            .ingredient(Ingredient::new("gamma", "Gamma", IngredientCategory::Active))
            .rule(
                ConflictRule::new("alpha", "beta", Severity::Low, "", "")
                    .morning_evening("alpha", "gamma"),
            )
            .build();
        assert!(matches!(bad_guidance, Err(DomainError::InvalidSlotGuidance { .. })));
    }
}
