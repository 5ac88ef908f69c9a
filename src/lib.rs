//! Streamgate - token-gated media playback
//!
//! A credential is re-validated against a remote authorization service on a
//! fixed cadence, and every verdict is enforced on a local playback state
//! machine. The library crate exposes the components for embedding and for
//! integration testing.

pub mod auth;
pub mod config;
pub mod origin;
pub mod playback;
pub mod player;
pub mod session;
pub mod validator;
