use super::{ValidationRequest, ValidationResult};
use reqwest::Client;
use streamgate_common::{Error, Result};

/// The external service that decides whether a credential may play.
#[async_trait::async_trait]
pub trait AuthorizationService: Send + Sync {
    /// Validate one request.
    ///
    /// An `Ok` result is the service's answer, valid or not. `Err` means the
    /// answer could not be obtained.
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult>;
}

/// [`AuthorizationService`] reached over HTTP with a JSON POST.
///
/// No request timeout is configured: a request that never completes leaves
/// the previous verdict in force until a later response supersedes it.
pub struct HttpAuthorizationService {
    client: Client,
    url: String,
}

impl HttpAuthorizationService {
    pub fn new(url: impl Into<String>, user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with user agent: {}", e);
                Client::new()
            });

        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl AuthorizationService for HttpAuthorizationService {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::transport(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(format!(
                "authorization service returned {status}: {body}"
            )));
        }

        response
            .json::<ValidationResult>()
            .await
            .map_err(|e| Error::transport(format!("invalid authorization response: {e}")))
    }
}
