use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 2] = [TimeOfDay::Morning, TimeOfDay::Evening];

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named product and its free-text ingredient list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Slot the product is meant for, when the caller knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeOfDay>,
}

impl ProductInput {
    pub fn new<I, S>(name: impl Into<String>, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            slot: None,
        }
    }

    pub fn in_slot(mut self, slot: TimeOfDay) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn matches_entry(&self, entry: &str) -> bool {
        let name = self.name.trim();
        !name.is_empty() && name.eq_ignore_ascii_case(entry.trim())
    }
}

/// One day's routine. Slot entries are either product names (expanded through
/// `products`) or ingredient names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub morning: Vec<String>,
    #[serde(default)]
    pub evening: Vec<String>,
    #[serde(default)]
    pub products: Vec<ProductInput>,
}

impl Routine {
    pub fn new<M, E, S>(morning: M, evening: E) -> Self
    where
        M: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            morning: morning.into_iter().map(Into::into).collect(),
            evening: evening.into_iter().map(Into::into).collect(),
            products: Vec::new(),
        }
    }

    pub fn with_product(mut self, product: ProductInput) -> Self {
        self.products.push(product);
        self
    }

    pub fn slot(&self, slot: TimeOfDay) -> &[String] {
        match slot {
            TimeOfDay::Morning => &self.morning,
            TimeOfDay::Evening => &self.evening,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.morning.is_empty()
            && self.evening.is_empty()
            && self.products.iter().all(|product| product.ingredients.is_empty())
    }

    pub fn find_product(&self, entry: &str) -> Option<&ProductInput> {
        self.products.iter().find(|product| product.matches_entry(entry))
    }

    /// Products no slot entry names. An entry schedules the first product it
    /// matches, so a later product with the same name stays unscheduled.
    pub fn unscheduled_products(&self) -> Vec<&ProductInput> {
        let scheduled = self
            .morning
            .iter()
            .chain(&self.evening)
            .filter_map(|entry| {
                self.products.iter().position(|product| product.matches_entry(entry))
            })
            .collect::<BTreeSet<_>>();

        self.products
            .iter()
            .enumerate()
            .filter(|(index, _)| !scheduled.contains(index))
            .map(|(_, product)| product)
            .collect()
    }

    fn name_taken(&self, name: &str) -> bool {
        let name = name.trim();
        self.morning
            .iter()
            .chain(&self.evening)
            .any(|entry| entry.trim().eq_ignore_ascii_case(name))
            || self.products.iter().any(|product| product.matches_entry(name))
    }

    /// Name `product` is filed under by [`Routine::with_addition`]. A name that
    /// already appears in the routine gets an `(added)` suffix so existing
    /// entries keep resolving to what they named before.
    pub fn addition_name(&self, product: &ProductInput) -> String {
        if !self.name_taken(&product.name) {
            return product.name.clone();
        }

        let mut candidate = format!("{} (added)", product.name.trim());
        let mut counter = 2;
        while self.name_taken(&candidate) {
            candidate = format!("{} (added {counter})", product.name.trim());
            counter += 1;
        }
        candidate
    }

    /// Returns a copy of this routine with `product` added under
    /// [`Routine::addition_name`]. A product carrying a slot is also scheduled
    /// into that slot.
    pub fn with_addition(&self, product: &ProductInput) -> Self {
        let mut added = product.clone();
        added.name = self.addition_name(product);

        let mut combined = self.clone();
        match added.slot {
            Some(TimeOfDay::Morning) => combined.morning.push(added.name.clone()),
            Some(TimeOfDay::Evening) => combined.evening.push(added.name.clone()),
            None => {}
        }
        combined.products.push(added);
        combined
    }
}
