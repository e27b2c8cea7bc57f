use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub skin_type: String,
    #[serde(default)]
    pub skin_concerns: Vec<String>,
    #[serde(default)]
    pub ingredient_allergies: Vec<String>,
    #[serde(default)]
    pub pregnant: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationReport {
    pub warnings: Vec<String>,
    pub benefit_notes: Vec<String>,
}
