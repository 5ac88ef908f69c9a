//! Network-origin resolution.
//!
//! The origin address is read from the navigable location. When the location
//! carries none, the configured default is assigned and echoed back into the
//! location (together with the current credential and username) so that a
//! reload keeps the same origin.

mod location;

pub use location::{Location, LocationParams, MemoryLocation};

use crate::config::OriginConfig;
use std::sync::Arc;
use streamgate_common::{Credential, NetworkOrigin};

const TOKEN_PARAM: &str = "token";
const USERNAME_PARAM: &str = "username";

/// Resolves the claimed network origin from an injected [`Location`].
pub struct OriginProvider {
    location: Arc<dyn Location>,
    default_address: String,
    param: String,
}

impl OriginProvider {
    pub fn new(location: Arc<dyn Location>, config: &OriginConfig) -> Self {
        Self {
            location,
            default_address: config.default_address.clone(),
            param: config.param.clone(),
        }
    }

    /// Resolve the origin for the current location.
    ///
    /// A non-empty address in the location wins and nothing is written.
    /// Otherwise the default is assigned and the location is rewritten to
    /// include it, with `token`/`username` set to the given values or removed
    /// when absent.
    pub fn resolve(&self, credential: &Credential, username: Option<&str>) -> NetworkOrigin {
        let mut params = self.location.parameters();

        if let Some(address) = params.get(&self.param).filter(|a| !a.is_empty()) {
            return NetworkOrigin::caller_provided(address);
        }

        params.set(&self.param, &self.default_address);

        if credential.is_empty() {
            params.remove(TOKEN_PARAM);
        } else {
            params.set(TOKEN_PARAM, credential.as_str());
        }

        match username.filter(|u| !u.is_empty()) {
            Some(name) => params.set(USERNAME_PARAM, name),
            None => params.remove(USERNAME_PARAM),
        }

        self.write(params);

        NetworkOrigin::defaulted(self.default_address.clone())
    }

    fn write(&self, params: LocationParams) {
        if self.location.parameters() == params {
            return;
        }

        tracing::info!(
            origin = %self.default_address,
            "Location has no origin; writing default"
        );
        self.location.replace(params);
    }
}
