use thiserror::Error;

use crate::domain::ingredient::IngredientId;
use crate::domain::rule::PairKey;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("ingredient id must not be empty")]
    EmptyIngredientId,
    #[error("duplicate ingredient id `{0}`")]
    DuplicateIngredient(IngredientId),
    #[error("rule `{pair}` references unknown ingredient `{ingredient}`")]
    UnknownRuleIngredient { pair: PairKey, ingredient: IngredientId },
    #[error("rule pairs `{0}` with itself")]
    SelfConflict(IngredientId),
    #[error("duplicate rule for pair `{0}`")]
    DuplicateRule(PairKey),
    #[error("rule `{pair}` slot guidance names `{ingredient}`, which is not in the pair")]
    InvalidSlotGuidance { pair: PairKey, ingredient: IngredientId },
    #[error("ingredient `{ingredient}` references unknown ingredient `{reference}`")]
    UnknownReference { ingredient: IngredientId, reference: IngredientId },
    #[error("ingredient `{ingredient}` has invalid {field}: {detail}")]
    InvalidIngredient { ingredient: IngredientId, field: &'static str, detail: String },
    #[error("unknown skin type `{0}`")]
    UnknownSkinType(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("rule pack failure: {0}")]
    RulePack(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::Internal { correlation_id, .. } => {
                correlation_id
            }
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::UnknownSkinType(skin_type)) => Self::BadRequest {
                message: format!("unknown skin type `{skin_type}`"),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Domain(_) | ApplicationError::RulePack(_) => Self::Internal {
                message: "reference data failed validation".to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::ingredient::IngredientId;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn skin_type_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::UnknownSkinType("scaly".to_owned()))
            .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn reference_data_error_maps_to_internal() {
        let interface = ApplicationError::from(DomainError::DuplicateIngredient(
            IngredientId::new("retinol"),
        ))
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.correlation_id(), "req-2");
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn configuration_error_keeps_message() {
        let interface = ApplicationError::Configuration("max_passes out of range".to_owned())
            .into_interface("req-3");

        assert_eq!(interface.to_string(), "internal error: max_passes out of range");
    }
}
