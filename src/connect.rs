//! Connection configuration: credentials, region and the shared HTTP client.

use crate::client::{ApiClient, Endpoint};
use crate::error::{ProviderError, Result};
use crate::utils::create_http_client;

/// Environment variables honored by [`Connection::from_env`].
pub const ENV_SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";
pub const ENV_SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";
pub const ENV_SECURITY_TOKEN: &str = "TENCENTCLOUD_SECURITY_TOKEN";
pub const ENV_REGION: &str = "TENCENTCLOUD_REGION";

/// Authenticated connection to the cloud APIs.
///
/// One connection serves every product; per-product clients share its
/// HTTP pool and credentials. Cloning is cheap.
#[derive(Clone)]
pub struct Connection {
    http: reqwest::Client,
    secret_id: String,
    secret_key: String,
    /// STS 临时凭证附带的会话 token
    token: Option<String>,
    region: String,
}

/// Builder for [`Connection`].
#[derive(Default)]
pub struct ConnectionBuilder {
    secret_id: String,
    secret_key: String,
    token: Option<String>,
    region: String,
}

impl ConnectionBuilder {
    #[must_use]
    pub fn secret_id(mut self, secret_id: impl Into<String>) -> Self {
        self.secret_id = secret_id.into();
        self
    }

    #[must_use]
    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = secret_key.into();
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn build(self) -> Result<Connection> {
        if self.secret_id.is_empty() || self.secret_key.is_empty() {
            return Err(ProviderError::InvalidCredentials {
                product: "provider".to_string(),
                raw_message: Some("secret_id and secret_key are required".to_string()),
            });
        }
        if self.region.is_empty() {
            return Err(ProviderError::InvalidParameter {
                product: "provider".to_string(),
                param: "region".to_string(),
                detail: "region is required, e.g. ap-guangzhou".to_string(),
            });
        }
        Ok(Connection {
            http: create_http_client(),
            secret_id: self.secret_id,
            secret_key: self.secret_key,
            token: self.token,
            region: self.region,
        })
    }
}

impl Connection {
    #[must_use]
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }

    /// Build a connection from `TENCENTCLOUD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| std::env::var(name).unwrap_or_default();
        let mut builder = Self::builder()
            .secret_id(read(ENV_SECRET_ID))
            .secret_key(read(ENV_SECRET_KEY))
            .region(read(ENV_REGION));
        if let Ok(token) = std::env::var(ENV_SECURITY_TOKEN)
            && !token.is_empty()
        {
            builder = builder.token(token);
        }
        builder.build().map_err(|e| match e {
            ProviderError::InvalidCredentials { product, .. } => {
                ProviderError::InvalidCredentials {
                    product,
                    raw_message: Some(format!(
                        "{ENV_SECRET_ID} and {ENV_SECRET_KEY} must be set"
                    )),
                }
            }
            ProviderError::InvalidParameter { product, param, .. } => {
                ProviderError::InvalidParameter {
                    product,
                    param,
                    detail: format!("{ENV_REGION} must be set, e.g. ap-guangzhou"),
                }
            }
            other => other,
        })
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn secret_id(&self) -> &str {
        &self.secret_id
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Per-product client bound to this connection.
    pub(crate) fn client(&self, endpoint: Endpoint) -> ApiClient {
        ApiClient::new(self, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_credentials() {
        let err = Connection::builder().region("ap-guangzhou").build();
        assert!(matches!(err, Err(ProviderError::InvalidCredentials { .. })));

        let err = Connection::builder()
            .secret_id("id")
            .region("ap-guangzhou")
            .build();
        assert!(matches!(err, Err(ProviderError::InvalidCredentials { .. })));
    }

    #[test]
    fn builder_requires_region() {
        let err = Connection::builder()
            .secret_id("id")
            .secret_key("key")
            .build();
        assert!(
            matches!(err, Err(ProviderError::InvalidParameter { ref param, .. }) if param == "region")
        );
    }

    #[test]
    fn builder_accepts_full_config() {
        let conn = Connection::builder()
            .secret_id("id")
            .secret_key("key")
            .token("sts-token")
            .region("ap-singapore")
            .build()
            .unwrap();
        assert_eq!(conn.region(), "ap-singapore");
        assert_eq!(conn.token(), Some("sts-token"));
    }
}
