//! Common error types used throughout streamgate.
//!
//! Every access-related failure is fail-closed: [`Error::verdict`] turns it
//! into the invalid [`Verdict`] that gets published to the player.

use crate::types::Verdict;

/// Message published when the session was started without a credential.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "No token provided";

/// Message published when the authorization service could not be reached or
/// its answer could not be processed.
pub const CLIENT_ERROR_MESSAGE: &str = "Client-side error during token validation.";

/// Common error type for streamgate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No credential was supplied for the session.
    #[error("No token provided")]
    MissingCredential,

    /// Calling the authorization service failed (network, status or decoding).
    #[error("Authorization transport failure: {0}")]
    TransportFailure(String),

    /// The authorization service explicitly declared the credential invalid.
    #[error("Rejected by authorization service: {0}")]
    ServiceRejected(String),

    /// Configuration could not be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The validator could not run (e.g. no async runtime to schedule on).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new TransportFailure error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::TransportFailure(msg.into())
    }

    /// Create a new ServiceRejected error.
    pub fn rejected<S: Into<String>>(msg: S) -> Self {
        Self::ServiceRejected(msg.into())
    }

    /// Create a new InvalidConfig error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// The invalid verdict this error resolves to.
    ///
    /// The service-provided message of [`Error::ServiceRejected`] is surfaced
    /// verbatim; everything that is not a missing credential or an explicit
    /// rejection surfaces the generic client-side message.
    pub fn verdict(&self) -> Verdict {
        match self {
            Error::MissingCredential => Verdict::invalid(MISSING_CREDENTIAL_MESSAGE),
            Error::ServiceRejected(message) => Verdict::invalid(message.clone()),
            Error::TransportFailure(_)
            | Error::InvalidConfig(_)
            | Error::Internal(_) => Verdict::invalid(CLIENT_ERROR_MESSAGE),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
