use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientId(pub String);

impl IngredientId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Active,
    Humectant,
    Emollient,
    Occlusive,
    Exfoliant,
    Antioxidant,
    Botanical,
    Peptide,
    Sunscreen,
    Solvent,
    Fragrance,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrritationPotential {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Normal,
    Dry,
    Oily,
    Combination,
    Sensitive,
    AcneProne,
}

impl SkinType {
    pub fn label(&self) -> &'static str {
        match self {
            SkinType::Normal => "normal",
            SkinType::Dry => "dry",
            SkinType::Oily => "oily",
            SkinType::Combination => "combination",
            SkinType::Sensitive => "sensitive",
            SkinType::AcneProne => "acne-prone",
        }
    }
}

impl std::str::FromStr for SkinType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "normal" => Ok(Self::Normal),
            "dry" => Ok(Self::Dry),
            "oily" => Ok(Self::Oily),
            "combination" | "combo" => Ok(Self::Combination),
            "sensitive" => Ok(Self::Sensitive),
            "acne-prone" | "acne" => Ok(Self::AcneProne),
            other => Err(DomainError::UnknownSkinType(other.to_string())),
        }
    }
}

/// Inclusive pH window a formulation of this ingredient is effective in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PhRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> Decimal {
        (self.min + self.max) / Decimal::TWO
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max && self.min >= Decimal::ZERO && self.max <= Decimal::from(14)
    }
}

/// Typical use concentration, in percent of the formulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentrationRange {
    pub min_pct: Decimal,
    pub max_pct: Decimal,
}

impl ConcentrationRange {
    pub fn new(min_pct: Decimal, max_pct: Decimal) -> Self {
        Self { min_pct, max_pct }
    }

    pub fn is_valid(&self) -> bool {
        self.min_pct <= self.max_pct
            && self.min_pct >= Decimal::ZERO
            && self.max_pct <= Decimal::ONE_HUNDRED
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub display_name: String,
    #[serde(default)]
    pub inci_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub category: IngredientCategory,
    #[serde(default)]
    pub purposes: BTreeSet<String>,
    #[serde(default)]
    pub comedogenic_rating: u8,
    #[serde(default)]
    pub irritation: IrritationPotential,
    #[serde(default)]
    pub ph_range: Option<PhRange>,
    #[serde(default)]
    pub concentration: Option<ConcentrationRange>,
    #[serde(default)]
    pub suited_skin_types: BTreeSet<SkinType>,
    #[serde(default)]
    pub avoid_skin_types: BTreeSet<SkinType>,
    #[serde(default = "default_pregnancy_safe")]
    pub pregnancy_safe: bool,
    #[serde(default)]
    pub photosensitizing: bool,
    #[serde(default)]
    pub conflicts_with: BTreeSet<IngredientId>,
    #[serde(default)]
    pub synergizes_with: BTreeSet<IngredientId>,
}

fn default_pregnancy_safe() -> bool {
    true
}

impl Ingredient {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        category: IngredientCategory,
    ) -> Self {
        Self {
            id: IngredientId::new(id),
            display_name: display_name.into(),
            inci_name: String::new(),
            aliases: Vec::new(),
            category,
            purposes: BTreeSet::new(),
            comedogenic_rating: 0,
            irritation: IrritationPotential::Low,
            ph_range: None,
            concentration: None,
            suited_skin_types: BTreeSet::new(),
            avoid_skin_types: BTreeSet::new(),
            pregnancy_safe: true,
            photosensitizing: false,
            conflicts_with: BTreeSet::new(),
            synergizes_with: BTreeSet::new(),
        }
    }

    pub fn with_inci(mut self, inci_name: impl Into<String>) -> Self {
        self.inci_name = inci_name.into();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_purposes<I, S>(mut self, purposes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.purposes.extend(purposes.into_iter().map(Into::into));
        self
    }

    pub fn with_comedogenic_rating(mut self, rating: u8) -> Self {
        self.comedogenic_rating = rating;
        self
    }

    pub fn with_irritation(mut self, irritation: IrritationPotential) -> Self {
        self.irritation = irritation;
        self
    }

    pub fn with_ph(mut self, min: Decimal, max: Decimal) -> Self {
        self.ph_range = Some(PhRange::new(min, max));
        self
    }

    pub fn with_concentration(mut self, min_pct: Decimal, max_pct: Decimal) -> Self {
        self.concentration = Some(ConcentrationRange::new(min_pct, max_pct));
        self
    }

    pub fn suited_for<I: IntoIterator<Item = SkinType>>(mut self, skin_types: I) -> Self {
        self.suited_skin_types.extend(skin_types);
        self
    }

    pub fn avoid_for<I: IntoIterator<Item = SkinType>>(mut self, skin_types: I) -> Self {
        self.avoid_skin_types.extend(skin_types);
        self
    }

    pub fn not_pregnancy_safe(mut self) -> Self {
        self.pregnancy_safe = false;
        self
    }

    pub fn photosensitizing(mut self) -> Self {
        self.photosensitizing = true;
        self
    }

    pub fn synergizes_with<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synergizes_with.extend(ids.into_iter().map(IngredientId::new));
        self
    }

    pub fn is_active(&self) -> bool {
        self.category == IngredientCategory::Active
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{PhRange, SkinType};

    #[test]
    fn ph_midpoint_is_exact_average() {
        let range = PhRange::new(Decimal::new(25, 1), Decimal::new(35, 1));
        assert_eq!(range.midpoint(), Decimal::new(3, 0));
        assert!(range.is_valid());
        assert!(!PhRange::new(Decimal::from(6), Decimal::from(4)).is_valid());
    }

    #[test]
    fn skin_type_parses_common_spellings() {
        assert_eq!("Acne Prone".parse::<SkinType>().ok(), Some(SkinType::AcneProne));
        assert_eq!("combo".parse::<SkinType>().ok(), Some(SkinType::Combination));
        assert!("scaly".parse::<SkinType>().is_err());
    }
}
