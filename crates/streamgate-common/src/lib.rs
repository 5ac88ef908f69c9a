//! Streamgate-Common: Shared types, identifiers, and error handling.
//!
//! This crate provides the vocabulary shared by the validator, the playback
//! controller and the command-line front end:
//!
//! - **Typed IDs**: [`Generation`] markers for validation cycles and
//!   [`SessionId`] for player sessions
//! - **Core Types**: credentials, network origins, verdicts and playback state
//! - **Error Handling**: the fail-closed error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use streamgate_common::{Credential, Error, UserMode, Verdict};
//!
//! let credential = Credential::new("abc123");
//! assert!(!credential.is_empty());
//!
//! assert_eq!(UserMode::derive(Some("alice")), UserMode::Legitimate);
//! assert_eq!(UserMode::derive(None), UserMode::Pirate);
//!
//! let verdict: Verdict = Error::MissingCredential.verdict();
//! assert!(!verdict.is_valid);
//! assert_eq!(verdict.message, "No token provided");
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result, CLIENT_ERROR_MESSAGE};
pub use ids::*;
pub use types::*;
