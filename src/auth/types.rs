use crate::config::Config;
use serde::{Deserialize, Serialize};
use streamgate_common::{Credential, NetworkOrigin, Verdict};

/// Fixed inputs of every validation request that do not come from the
/// session: claim, browsing context and the gated resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub claim: String,
    pub user_agent: String,
    pub hostname: String,
    pub resource_path: String,
}

impl RequestContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            claim: config.validation.claim.clone(),
            user_agent: config.client.user_agent.clone(),
            hostname: config.client.hostname.clone(),
            resource_path: config.media.resource_path.clone(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Body sent to the authorization service.
///
/// Field names are part of the service contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub token: String,
    pub token_claim: String,
    pub request_useragent: String,
    pub request_ip: String,
    pub request_hostname: String,
    pub request_path: String,
}

impl ValidationRequest {
    pub fn new(credential: &Credential, origin: &NetworkOrigin, context: &RequestContext) -> Self {
        Self {
            token: credential.as_str().to_string(),
            token_claim: context.claim.clone(),
            request_useragent: context.user_agent.clone(),
            request_ip: origin.address.clone(),
            request_hostname: context.hostname.clone(),
            request_path: context.resource_path.clone(),
        }
    }
}

/// Answer of the authorization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(default)]
    pub message: String,
}

impl ValidationResult {
    pub fn valid<S: Into<String>>(message: S) -> Self {
        Self {
            is_valid: true,
            message: message.into(),
        }
    }

    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }

    /// Publishable verdict, message carried over verbatim.
    pub fn into_verdict(self) -> Verdict {
        Verdict::new(self.is_valid, self.message)
    }
}
