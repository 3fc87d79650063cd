//! Asynchronous SolusVM client implementation.

use crate::decode::decode_response;
use crate::models::{RawStatusResponse, VirtualMachineSnapshot};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use secrecy::{ExposeSecret, SecretString};
use solusvm_core::client::ClientConfig;
use solusvm_core::config::{command_endpoint, SolusVmConfig};
use solusvm_core::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Flags sent with `info` to request every optional status field.
const STATUS_FLAGS: [&str; 5] = ["status", "hdd", "bw", "mem", "ipaddr"];

/// Remote operation, sent as the `action` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Start the virtual server.
    Boot,
    /// Restart the virtual server.
    Reboot,
    /// Stop the virtual server.
    Shutdown,
    /// Query status information.
    Info,
}

impl Action {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Reboot => "reboot",
            Self::Shutdown => "shutdown",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for [`VirtualMachineClient`].
pub struct VirtualMachineClientBuilder {
    endpoint: Url,
    key: String,
    hash: SecretString,
    http_config: ClientConfig,
    tls_verify: bool,
    ca_cert: Option<PathBuf>,
    transport: Option<Arc<dyn Transport>>,
}

impl VirtualMachineClientBuilder {
    /// Create a builder for the panel at `host` (without the API path).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if `host` does not form a valid URL.
    pub fn new(
        host: impl AsRef<str>,
        key: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<Self> {
        let hash: String = hash.into();
        Ok(Self {
            endpoint: command_endpoint(host.as_ref())?,
            key: key.into(),
            hash: SecretString::from(hash),
            http_config: ClientConfig::default(),
            tls_verify: true,
            ca_cert: None,
            transport: None,
        })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Trust an additional CA certificate (PEM file).
    #[must_use]
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Use a custom transport instead of the built-in HTTP one.
    ///
    /// HTTP and TLS settings on this builder are ignored when a transport is supplied.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP transport cannot be built.
    pub fn build(self) -> Result<VirtualMachineClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_tls(
                &self.http_config,
                self.tls_verify,
                self.ca_cert.as_deref(),
            )?),
        };

        Ok(VirtualMachineClient {
            inner: Arc::new(ClientInner {
                endpoint: self.endpoint,
                key: self.key,
                hash: self.hash,
                transport,
            }),
        })
    }
}

/// Asynchronous client for one virtual server on a SolusVM panel.
///
/// Cloning is cheap and clones share the same credentials and transport. Each operation sends
/// exactly one request and never retries.
#[derive(Clone)]
pub struct VirtualMachineClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    endpoint: Url,
    key: String,
    hash: SecretString,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for VirtualMachineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualMachineClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("key", &self.inner.key)
            .finish_non_exhaustive()
    }
}

impl VirtualMachineClient {
    /// Construct a client for the panel at `host` with the server's API key and hash.
    ///
    /// No request is sent. The command endpoint is `host` followed by
    /// `/api/client/command.php`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if `host` does not form a valid URL, or
    /// [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn new(
        host: impl AsRef<str>,
        key: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<Self> {
        VirtualMachineClientBuilder::new(host, key, hash)?.build()
    }

    /// Start building a client with non-default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if `host` does not form a valid URL.
    pub fn builder(
        host: impl AsRef<str>,
        key: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<VirtualMachineClientBuilder> {
        VirtualMachineClientBuilder::new(host, key, hash)
    }

    /// Construct a client from a validated [`SolusVmConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &SolusVmConfig) -> Result<Self> {
        config.check()?;

        let mut builder = VirtualMachineClientBuilder::new(
            &config.host,
            config.key.clone(),
            config.hash.expose_secret(),
        )?
        .with_http_config(ClientConfig::default().with_timeout(config.timeout()))
        .with_tls_verify(config.tls_verify);

        if let Some(ca_cert) = &config.tls_ca_cert {
            builder = builder.with_ca_cert(ca_cert.clone());
        }

        builder.build()
    }

    /// Full URL of the command endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// API key this client authenticates with.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Boot the virtual server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] with the panel's message if the panel refuses, or a transport
    /// or decode error.
    pub async fn boot(&self) -> Result<()> {
        self.perform(Action::Boot).await
    }

    /// Reboot the virtual server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] with the panel's message if the panel refuses, or a transport
    /// or decode error.
    pub async fn reboot(&self) -> Result<()> {
        self.perform(Action::Reboot).await
    }

    /// Shut down the virtual server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] with the panel's message if the panel refuses, or a transport
    /// or decode error.
    pub async fn shutdown(&self) -> Result<()> {
        self.perform(Action::Shutdown).await
    }

    /// Query hostname, addresses, resource usage and run state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] with the panel's message if the panel refuses,
    /// [`Error::MalformedUsage`] if a usage figure cannot be parsed, or a transport or decode
    /// error.
    pub async fn status(&self) -> Result<VirtualMachineSnapshot> {
        let response = self.execute(Action::Info, &STATUS_FLAGS).await?;
        VirtualMachineSnapshot::from_response(self.clone(), response)
            .map_err(|err| log_failure(Action::Info, err))
    }

    async fn perform(&self, action: Action) -> Result<()> {
        self.execute(action, &[]).await.map(|_| ())
    }

    async fn execute(&self, action: Action, flags: &[&str]) -> Result<RawStatusResponse> {
        self.exchange(action, flags)
            .await
            .map_err(|err| log_failure(action, err))
    }

    async fn exchange(&self, action: Action, flags: &[&str]) -> Result<RawStatusResponse> {
        let form = self.form(action, flags);
        info!(%action, endpoint = %self.inner.endpoint, "SolusVM request");

        let body = self
            .inner
            .transport
            .post_form(&self.inner.endpoint, &form)
            .await?;

        decode_response(&body)?.into_result()
    }

    fn form(&self, action: Action, flags: &[&str]) -> Vec<(String, String)> {
        let mut form = Vec::with_capacity(3 + flags.len());
        form.push(("action".to_string(), action.as_str().to_string()));
        form.push(("key".to_string(), self.inner.key.clone()));
        form.push((
            "hash".to_string(),
            self.inner.hash.expose_secret().to_string(),
        ));
        form.extend(
            flags
                .iter()
                .map(|flag| ((*flag).to_string(), "true".to_string())),
        );
        form
    }
}

fn log_failure(action: Action, err: Error) -> Error {
    if err.should_log() {
        warn!(%action, code = err.error_code(), "SolusVM request failed: {err}");
    } else {
        debug!(%action, code = err.error_code(), "SolusVM request refused: {err}");
    }
    err
}
