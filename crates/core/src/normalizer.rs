//! Free-text ingredient name resolution.
//!
//! Names are folded with [`normalize_name`] and matched against a table built
//! from the knowledge base, in strict priority order:
//!
//! 1. exact canonical id,
//! 2. exact alias (display name, INCI name and declared aliases),
//! 3. partial match, where one side contains the other as a run of whole words.
//!
//! Within a tier the first ingredient in declaration order wins; for the
//! partial tier an ingredient's canonical id and its aliases count as one
//! candidate. Partial matches compare whole words, with digits split off
//! letters, so `aqua` never matches `aquaporin booster` while
//! `Niacinamide(5%)` still reads as `niacinamide 5`. A raw name containing a
//! known alias always matches, however short the alias (`bpo 5% gel`). The
//! reverse direction only applies when the raw name has at least
//! [`MIN_PARTIAL_LEN`] characters, so generic words such as `acid` or `oil`
//! do not resolve to anything.

use serde::{Deserialize, Serialize};

use crate::domain::ingredient::{Ingredient, IngredientId};

pub const MIN_PARTIAL_LEN: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    CanonicalId,
    Alias,
    Partial,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub id: IngredientId,
    pub tier: MatchTier,
}

/// Lower-cases, drops every non-alphanumeric character except whitespace, and
/// collapses whitespace runs into single spaces. Idempotent.
pub fn normalize_name(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_whitespace() {
            folded.push(' ');
        } else if ch.is_alphanumeric() {
            folded.extend(ch.to_lowercase().filter(|lowered| lowered.is_alphanumeric()));
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word list used by the partial tier. Punctuation separates words and a run
/// of digits is its own word, so `l-ascorbic acid` and `niacinamide(5%)` give
/// `[l, ascorbic, acid]` and `[niacinamide, 5]`.
pub fn partial_words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for ch in raw.chars().flat_map(char::to_lowercase) {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let is_digit = ch.is_numeric();
        if !current.is_empty() && is_digit != current_is_digit {
            words.push(std::mem::take(&mut current));
        }
        current_is_digit = is_digit;
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn contains_words(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}

fn word_chars(words: &[String]) -> usize {
    words.iter().map(|word| word.chars().count()).sum()
}

#[derive(Clone, Debug)]
struct PartialCandidate {
    id: IngredientId,
    names: Vec<Vec<String>>,
}

impl PartialCandidate {
    fn push_name(&mut self, name: &str) {
        let words = partial_words(name);
        if !words.is_empty() && !self.names.contains(&words) {
            self.names.push(words);
        }
    }

    fn matches(&self, raw: &[String]) -> bool {
        let raw_is_specific = word_chars(raw) >= MIN_PARTIAL_LEN;
        self.names
            .iter()
            .any(|name| contains_words(raw, name) || (raw_is_specific && contains_words(name, raw)))
    }
}

#[derive(Clone, Debug, Default)]
pub struct NormalizationTable {
    canonical: Vec<(String, IngredientId)>,
    aliases: Vec<(String, IngredientId)>,
    partial: Vec<PartialCandidate>,
}

impl NormalizationTable {
    pub fn build(ingredients: &[Ingredient]) -> Self {
        let mut table = Self::default();

        for ingredient in ingredients {
            table.canonical.push((normalize_name(ingredient.id.as_str()), ingredient.id.clone()));

            let mut candidate =
                PartialCandidate { id: ingredient.id.clone(), names: Vec::new() };
            candidate.push_name(ingredient.id.as_str());

            let names = std::iter::once(ingredient.display_name.as_str())
                .chain(std::iter::once(ingredient.inci_name.as_str()))
                .chain(ingredient.aliases.iter().map(String::as_str));
            for name in names {
                let key = normalize_name(name);
                if key.is_empty() || table.has_alias(&key, &ingredient.id) {
                    continue;
                }
                candidate.push_name(name);
                table.aliases.push((key, ingredient.id.clone()));
            }

            table.partial.push(candidate);
        }

        table
    }

    fn has_alias(&self, key: &str, id: &IngredientId) -> bool {
        self.aliases.iter().any(|(existing, owner)| existing == key && owner == id)
    }

    pub fn resolve(&self, raw: &str) -> Option<Resolution> {
        let key = normalize_name(raw);
        if key.is_empty() {
            return None;
        }

        if let Some((_, id)) = self.canonical.iter().find(|(canonical, _)| *canonical == key) {
            return Some(Resolution { id: id.clone(), tier: MatchTier::CanonicalId });
        }

        if let Some((_, id)) = self.aliases.iter().find(|(alias, _)| *alias == key) {
            return Some(Resolution { id: id.clone(), tier: MatchTier::Alias });
        }

        let words = partial_words(raw);
        self.partial
            .iter()
            .find(|candidate| candidate.matches(&words))
            .map(|candidate| Resolution { id: candidate.id.clone(), tier: MatchTier::Partial })
    }

    pub fn len(&self) -> usize {
        self.aliases.len() + self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, partial_words, MatchTier, NormalizationTable};
    use crate::domain::ingredient::{Ingredient, IngredientCategory};

    fn table() -> NormalizationTable {
        NormalizationTable::build(&[
            Ingredient::new("water", "Water", IngredientCategory::Solvent)
                .with_inci("Aqua")
                .with_aliases(["eau"]),
            Ingredient::new("vitamin-c", "Vitamin C", IngredientCategory::Active)
                .with_inci("Ascorbic Acid")
                .with_aliases(["l-ascorbic acid"]),
            Ingredient::new("hyaluronic-acid", "Hyaluronic Acid", IngredientCategory::Humectant)
                .with_aliases(["sodium hyaluronate"]),
            Ingredient::new("glycolic-acid", "Glycolic Acid", IngredientCategory::Active),
        ])
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["  Vitamin-C  Serum ", "L-Ascorbic   Acid (15%)", "Crème  Hydratante", ""] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once, "not idempotent for {raw:?}");
        }
        assert_eq!(normalize_name("L-Ascorbic   Acid (15%)"), "lascorbic acid 15");
    }

    #[test]
    fn resolution_follows_tier_priority() {
        let table = table();

        let exact = table.resolve("Vitamin-C").expect("canonical id");
        assert_eq!(exact.id.as_str(), "vitamin-c");
        assert_eq!(exact.tier, MatchTier::CanonicalId);

        let alias = table.resolve("Sodium Hyaluronate").expect("alias");
        assert_eq!(alias.id.as_str(), "hyaluronic-acid");
        assert_eq!(alias.tier, MatchTier::Alias);

        let partial = table.resolve("Ascorbic Acid 20% Serum").expect("partial");
        assert_eq!(partial.id.as_str(), "vitamin-c");
        assert_eq!(partial.tier, MatchTier::Partial);
    }

    #[test]
    fn aqua_does_not_match_inside_longer_words() {
        let table = table();
        assert_eq!(table.resolve("aquaporin booster"), None);
        assert_eq!(table.resolve("Aqua").map(|found| found.id.0), Some("water".to_string()));
    }

    #[test]
    fn generic_words_stay_unresolved() {
        let table = table();
        assert_eq!(table.resolve("acid"), None);
        assert_eq!(table.resolve("!!!"), None);
        assert_eq!(table.resolve("unicorn extract"), None);
    }

    #[test]
    fn short_aliases_match_inside_product_names() {
        let table = NormalizationTable::build(&[
            Ingredient::new("benzoyl-peroxide", "Benzoyl Peroxide", IngredientCategory::Active)
                .with_aliases(["bpo"]),
            Ingredient::new("niacinamide", "Niacinamide", IngredientCategory::Antioxidant),
        ]);

        let bpo = table.resolve("BPO 5% gel").expect("short alias inside a longer name");
        assert_eq!(bpo.id.as_str(), "benzoyl-peroxide");
        assert_eq!(bpo.tier, MatchTier::Partial);

        let fused = table.resolve("Niacinamide(5%)").expect("punctuation-fused name");
        assert_eq!(fused.id.as_str(), "niacinamide");
        assert_eq!(table.resolve("bp"), None);
    }

    #[test]
    fn partial_words_split_digits_and_punctuation() {
        assert_eq!(partial_words("Niacinamide(5%)"), ["niacinamide", "5"]);
        assert_eq!(partial_words("L-Ascorbic Acid 15%"), ["l", "ascorbic", "acid", "15"]);
        assert_eq!(partial_words("GHK-Cu"), ["ghk", "cu"]);
        assert!(partial_words("--").is_empty());
    }

    #[test]
    fn partial_tier_follows_declaration_order_across_names() {
        let table = NormalizationTable::build(&[
            Ingredient::new("retinol", "Vitamin A Alcohol", IngredientCategory::Active),
            Ingredient::new("bakuchiol", "Bakuchiol", IngredientCategory::Botanical)
                .with_aliases(["retinol alternative"]),
        ]);

        let found = table.resolve("Retinol Alternative Serum").expect("partial");
        assert_eq!(found.id.as_str(), "retinol");
        assert_eq!(found.tier, MatchTier::Partial);
    }
}
