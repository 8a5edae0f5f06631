use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("input rejected: {0}")]
    InputRejected(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

/// Outward-facing failure. `message` is operator detail and never leaves the
/// process; callers only ever see [`InterfaceError::user_message`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "invalid product code",
            Self::NotFound { .. } => "product not found",
            Self::Internal { .. } => "failed to retrieve product",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::InputRejected(message)) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::NotFound(message) => {
                Self::NotFound { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Domain(DomainError::InvariantViolation(message))
            | ApplicationError::Persistence(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn rejected_input_maps_to_bad_request() {
        let interface =
            ApplicationError::from(DomainError::InputRejected("too long".to_owned()))
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(interface.status_code(), 400);
    }

    #[test]
    fn not_found_is_distinct_from_persistence_failure() {
        let missing = ApplicationError::NotFound("code=NOPE".to_owned()).into_interface("req-2");
        let broken =
            ApplicationError::Persistence("database is locked".to_owned()).into_interface("req-3");

        assert_eq!(missing.status_code(), 404);
        assert_eq!(broken.status_code(), 500);
        assert_ne!(missing.user_message(), broken.user_message());
    }

    #[test]
    fn user_message_never_carries_operator_detail() {
        let interface = ApplicationError::Persistence("no such table: products".to_owned())
            .into_interface("req-4");

        assert_eq!(interface.user_message(), "failed to retrieve product");
        assert!(!interface.user_message().contains("products"));
        assert_eq!(interface.correlation_id(), "req-4");
    }

    #[test]
    fn invariant_violation_maps_to_internal() {
        let interface =
            ApplicationError::from(DomainError::InvariantViolation("negative price".to_owned()))
                .into_interface("req-5");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
    }
}
