use thiserror::Error;

use crate::domain::product::{DecodeError, ProductId};
use crate::validation::ValidationError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("product validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("product `{0}` not found")]
    ProductNotFound(ProductId),
    #[error("invalid product identifier: {0}")]
    InvalidIdentifier(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. } | Self::NotFound { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::NotFound { correlation_id, .. } => {
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
            | InterfaceError::NotFound { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ValidationError> for ApplicationError {
    fn from(value: ValidationError) -> Self {
        Self::Domain(DomainError::Validation(value))
    }
}

impl From<DecodeError> for ApplicationError {
    fn from(value: DecodeError) -> Self {
        Self::Domain(DomainError::Decode(value))
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let unassigned = || "unassigned".to_owned();
        match value {
            ApplicationError::Domain(DomainError::Validation(error)) => Self::BadRequest {
                message: format!("Error validating product: {error}"),
                correlation_id: unassigned(),
            },
            ApplicationError::Domain(DomainError::Decode(error)) => Self::BadRequest {
                message: format!("Unable to unmarshal json: {error}"),
                correlation_id: unassigned(),
            },
            ApplicationError::Domain(DomainError::InvalidIdentifier(message)) => {
                Self::BadRequest { message, correlation_id: unassigned() }
            }
            ApplicationError::Domain(DomainError::ProductNotFound(id)) => Self::NotFound {
                message: format!("Product {id} Not Found"),
                correlation_id: unassigned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::product::{DecodeError, ProductId};
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::validation::ValidationError;

    #[test]
    fn validation_error_maps_to_bad_request_naming_the_field() {
        let interface = ApplicationError::from(ValidationError::Required { field: "name" })
            .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert!(interface.message().contains("name"));
    }

    #[test]
    fn decode_error_maps_to_bad_request() {
        let interface =
            ApplicationError::from(DecodeError::NotAnObject).into_interface("req-2");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert_eq!(
            interface.message(),
            "Unable to unmarshal json: product payload must be a JSON object"
        );
    }

    #[test]
    fn missing_product_maps_to_not_found() {
        let interface = ApplicationError::from(DomainError::ProductNotFound(ProductId(99)))
            .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
        assert!(interface.message().contains("99"));
    }

    #[test]
    fn invalid_identifier_keeps_its_message() {
        let interface =
            ApplicationError::from(DomainError::InvalidIdentifier("bad id `x`".to_owned()))
                .into_interface("req-4");

        assert_eq!(
            interface,
            InterfaceError::BadRequest {
                message: "bad id `x`".to_owned(),
                correlation_id: "req-4".to_owned(),
            }
        );
    }
}
