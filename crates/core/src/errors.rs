use thiserror::Error;

/// Caller-visible failure classes for the HTTP entry points.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into(), correlation_id: "unassigned".to_owned() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into(), correlation_id: "unassigned".to_owned() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), correlation_id: "unassigned".to_owned() }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        match &mut self {
            Self::Unauthorized { correlation_id: id, .. }
            | Self::BadRequest { correlation_id: id, .. }
            | Self::Internal { correlation_id: id, .. } => *id = correlation_id.into(),
        }
        self
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::BadRequest { .. } => 400,
            Self::Internal { .. } => 500,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Unauthorized { correlation_id, .. }
            | Self::BadRequest { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }

    /// Plain-text response body. Bad requests echo their message since Slack
    /// shows it to the person who ran the command; the other classes stay
    /// generic.
    pub fn response_body(&self) -> String {
        match self {
            Self::Unauthorized { .. } => "Invalid Slack Signing Secret".to_owned(),
            Self::BadRequest { message, .. } => message.clone(),
            Self::Internal { .. } => "Internal Server Error".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::InterfaceError;

    #[test]
    fn bad_request_echoes_message_and_maps_to_400() {
        let error = InterfaceError::bad_request("Missing trigger_id").with_correlation_id("req-1");

        assert_eq!(error.status_code(), 400);
        assert_eq!(error.response_body(), "Missing trigger_id");
        assert_eq!(error.correlation_id(), "req-1");
    }

    #[test]
    fn internal_error_hides_detail() {
        let error = InterfaceError::internal("views.update failed: hash_conflict");

        assert_eq!(error.status_code(), 500);
        assert_eq!(error.response_body(), "Internal Server Error");
        assert_eq!(error.correlation_id(), "unassigned");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let error = InterfaceError::unauthorized("signature mismatch");

        assert!(matches!(error, InterfaceError::Unauthorized { .. }));
        assert_eq!(error.status_code(), 401);
    }
}
