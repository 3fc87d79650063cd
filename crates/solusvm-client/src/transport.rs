//! Form-encoded POST transport.
//!
//! [`Transport`] is the only place the client touches the network. [`HttpTransport`] is the
//! reqwest-backed implementation; callers who need a different timeout, proxy or HTTP stack can
//! plug in their own implementation through
//! [`VirtualMachineClientBuilder::with_transport`](crate::VirtualMachineClientBuilder::with_transport).

use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use solusvm_core::client::ClientConfig;
use solusvm_core::Error;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("solusvm-client/", env!("CARGO_PKG_VERSION"));

/// Sends one form-encoded POST and returns the raw response body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `form` as `application/x-www-form-urlencoded` to `endpoint`.
    ///
    /// The HTTP status code is not inspected: the body is returned whatever the status.
    ///
    /// # Errors
    ///
    /// Returns a transport error ([`Error::Transport`], [`Error::Timeout`] or
    /// [`Error::ServiceUnavailable`]) when the exchange itself fails.
    async fn post_form(&self, endpoint: &Url, form: &[(String, String)]) -> Result<Vec<u8>>;
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    log_responses: bool,
}

impl HttpTransport {
    /// Build a transport from the given HTTP configuration, verifying TLS certificates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_tls(config, true, None)
    }

    /// Build a transport with explicit TLS settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the CA certificate cannot be read or parsed, or if the
    /// underlying HTTP client cannot be built.
    pub fn with_tls(config: &ClientConfig, tls_verify: bool, ca_cert: Option<&Path>) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if !config.enable_compression {
            builder = builder.no_gzip();
        }

        if !tls_verify {
            warn!("TLS verification disabled for SolusVM client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = ca_cert {
            debug!("loading SolusVM CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read SolusVM CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes).map_err(|err| {
                Error::ConfigError(format!("Invalid SolusVM CA certificate: {err}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build SolusVM HTTP client: {err}"))
        })?;

        Ok(Self {
            http,
            log_responses: config.enable_logging,
        })
    }

    /// Wrap an already configured reqwest client.
    #[must_use]
    pub fn from_client(http: Client) -> Self {
        Self {
            http,
            log_responses: true,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, endpoint: &Url, form: &[(String, String)]) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(endpoint.clone())
            .header("Accept", "text/xml, application/xml, */*")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if self.log_responses {
            debug!(%status, bytes = body.len(), "SolusVM response");
        }

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn post_form_encodes_fields_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/client/command.php"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("action=info&key=KEY&hash=a%2Bb%3Dc&hdd=true"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<status>success</status>"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let endpoint = Url::parse(&format!("{}/api/client/command.php", server.uri())).unwrap();
        let body = transport
            .post_form(
                &endpoint,
                &form(&[
                    ("action", "info"),
                    ("key", "KEY"),
                    ("hash", "a+b=c"),
                    ("hdd", "true"),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(body, b"<status>success</status>");
    }

    #[tokio::test]
    async fn post_form_returns_body_for_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string("<status>error</status>"),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&ClientConfig::default().with_logging(false)).unwrap();
        let endpoint = Url::parse(&server.uri()).unwrap();
        let body = transport.post_form(&endpoint, &[]).await.unwrap();
        assert_eq!(body, b"<status>error</status>");
    }

    #[tokio::test]
    async fn post_form_connection_refused_is_transport_error() {
        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let endpoint = Url::parse("http://127.0.0.1:1/api/client/command.php").unwrap();
        let err = transport.post_form(&endpoint, &[]).await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err:?}");
    }

    #[test]
    fn missing_ca_certificate_is_config_error() {
        let err = HttpTransport::with_tls(
            &ClientConfig::default(),
            true,
            Some(Path::new("/nonexistent/solusvm-ca.pem")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
