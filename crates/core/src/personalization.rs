use crate::domain::ingredient::{Ingredient, SkinType};
use crate::domain::profile::{PersonalizationReport, UserProfile};
use crate::domain::routine::ProductInput;
use crate::knowledge::{fold_key, KeywordNote, KnowledgeBase};

const HIGH_COMEDOGENIC_RATING: u8 = 4;

/// Single-product pass over a user's profile. Runs independently of the
/// conflict analysis and only reads the keyword tables plus ingredient
/// attributes.
pub struct Personalizer<'a> {
    knowledge: &'a KnowledgeBase,
    max_notes: usize,
}

impl<'a> Personalizer<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, max_notes: usize) -> Self {
        Self { knowledge, max_notes }
    }

    pub fn personalize(&self, profile: &UserProfile, product: &ProductInput) -> PersonalizationReport {
        let mut warnings = Vec::new();
        let mut benefit_notes = Vec::new();

        self.scan_allergies(profile, product, &mut warnings);

        // An unrecognized skin type skips the skin-type tables.
        let skin_type = profile.skin_type.parse::<SkinType>().ok();
        if let Some(skin_type) = skin_type {
            let keywords = self.knowledge.keywords();
            for caution in keywords.cautions_for(skin_type) {
                if mentions(product, &caution) {
                    push_unique(&mut warnings, caution.note);
                }
            }
            for benefit in keywords.benefits_for(skin_type) {
                if mentions(product, &benefit) {
                    push_unique(&mut benefit_notes, benefit.note);
                }
            }
            self.scan_attributes(skin_type, product, &mut warnings);
        }

        for concern in &profile.skin_concerns {
            for note in self.knowledge.keywords().concern_notes_for(concern) {
                if mentions(product, &note) {
                    push_unique(&mut benefit_notes, note.note);
                }
            }
        }

        if profile.pregnant {
            for ingredient in self.resolved(product) {
                if !ingredient.pregnancy_safe {
                    push_unique(
                        &mut warnings,
                        format!(
                            "{} is not recommended during pregnancy; check with your doctor.",
                            ingredient.display_name
                        ),
                    );
                }
            }
        }

        benefit_notes.truncate(self.max_notes);
        PersonalizationReport { warnings, benefit_notes }
    }

    fn scan_allergies(&self, profile: &UserProfile, product: &ProductInput, warnings: &mut Vec<String>) {
        for allergy in &profile.ingredient_allergies {
            let allergen = fold_key(allergy);
            if allergen.is_empty() {
                continue;
            }
            for raw in &product.ingredients {
                let ingredient = fold_key(raw);
                if ingredient.is_empty() {
                    continue;
                }
                if ingredient.contains(&allergen) || allergen.contains(&ingredient) {
                    push_unique(
                        warnings,
                        format!(
                            "Contains {}, which matches your allergy to {}.",
                            raw.trim(),
                            allergy.trim()
                        ),
                    );
                }
            }
        }
    }

    fn scan_attributes(&self, skin_type: SkinType, product: &ProductInput, warnings: &mut Vec<String>) {
        for ingredient in self.resolved(product) {
            if ingredient.avoid_skin_types.contains(&skin_type) {
                push_unique(
                    warnings,
                    format!(
                        "{} is generally not recommended for {} skin.",
                        ingredient.display_name,
                        skin_type.label()
                    ),
                );
            }
            let breakout_prone = matches!(skin_type, SkinType::Oily | SkinType::AcneProne);
            if breakout_prone && ingredient.comedogenic_rating >= HIGH_COMEDOGENIC_RATING {
                push_unique(
                    warnings,
                    format!(
                        "{} is highly comedogenic ({}/5) and may clog pores.",
                        ingredient.display_name, ingredient.comedogenic_rating
                    ),
                );
            }
        }
    }

    fn resolved(&self, product: &ProductInput) -> Vec<&'a Ingredient> {
        let knowledge = self.knowledge;
        let mut ingredients: Vec<&'a Ingredient> = Vec::new();
        let resolved = product
            .ingredients
            .iter()
            .filter_map(|raw| knowledge.resolve(raw))
            .filter_map(|id| knowledge.ingredient(&id));
        for ingredient in resolved {
            if !ingredients.iter().any(|seen| seen.id == ingredient.id) {
                ingredients.push(ingredient);
            }
        }
        ingredients
    }
}

fn mentions(product: &ProductInput, note: &KeywordNote) -> bool {
    product.ingredients.iter().any(|raw| note.matches(raw))
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}
