// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Transport seam between the dispatcher and the wire.
//!
//! The dispatcher never talks HTTP itself; it hands the rendered payload to
//! a [`RegistrationTransport`] together with the caller's
//! [`TransportOptions`], which it passes through without interpretation.
//! [`HttpTransport`] is the production implementation;
//! [`mock::MockTransport`] (behind the default `mock` feature) scripts
//! replies for tests.

#[cfg(feature = "mock")]
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::service::ServiceEndpoint;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Network-level failures. Retryable at the caller's discretion only; the
/// dispatcher never retries on its own.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("cannot connect to `{url}`: {detail}")]
    Connect { url: String, detail: String },
    #[error("request to `{url}` timed out")]
    Timeout { url: String },
    #[error("service returned HTTP status {status}")]
    Status { status: u16 },
    #[error("transport failure: {detail}")]
    Other { detail: String },
}

/// HTTP-level tuning carried opaquely from the caller to the transport.
///
/// The proxy override doubles as the fault-injection hook in tests: routing
/// a send through an unreachable proxy forces a connect failure without
/// touching the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    proxy: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    accept_invalid_certificates: bool,
}

impl TransportOptions {
    pub fn set_proxy(&mut self, url: impl Into<String>) -> &mut Self {
        self.proxy = Some(url.into());
        self
    }

    pub fn clear_proxy(&mut self) -> &mut Self {
        self.proxy = None;
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Disables certificate verification. Playground deployments behind
    /// interception proxies need this; production sends never should.
    pub fn set_accept_invalid_certificates(&mut self, accept: bool) -> &mut Self {
        self.accept_invalid_certificates = accept;
        self
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn accepts_invalid_certificates(&self) -> bool {
        self.accept_invalid_certificates
    }
}

/// Raw response of one transport round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub body: String,
    pub status: u16,
}

/// Performs the network call for one registration payload.
#[async_trait]
pub trait RegistrationTransport {
    /// POSTs `payload` to `endpoint` under `soap_action` and returns the raw
    /// response body with its HTTP status.
    ///
    /// Implementations classify connection, timeout and TLS failures into
    /// [`TransportError`]; interpreting the response body stays with the
    /// dispatcher.
    async fn invoke(
        &self,
        endpoint: &ServiceEndpoint,
        soap_action: &str,
        payload: &str,
        options: &TransportOptions,
    ) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed production transport.
#[derive(Debug, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }

    // Options can change between sends, so the client is rebuilt per call.
    fn client(options: &TransportOptions) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout().unwrap_or(DEFAULT_TIMEOUT))
            .connect_timeout(options.connect_timeout().unwrap_or(DEFAULT_CONNECT_TIMEOUT));
        if let Some(proxy) = options.proxy() {
            let proxy = reqwest::Proxy::all(proxy).map_err(|err| TransportError::Other {
                detail: err.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }
        if options.accepts_invalid_certificates() {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder.build().map_err(|err| TransportError::Other {
            detail: err.to_string(),
        })
    }
}

#[async_trait]
impl RegistrationTransport for HttpTransport {
    async fn invoke(
        &self,
        endpoint: &ServiceEndpoint,
        soap_action: &str,
        payload: &str,
        options: &TransportOptions,
    ) -> Result<TransportResponse, TransportError> {
        let client = Self::client(options)?;
        debug!("POST {} ({})", endpoint.url(), soap_action);
        let response = client
            .post(endpoint.url())
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(payload.to_string())
            .send()
            .await
            .map_err(|err| classify(endpoint.url(), &err))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Other {
                detail: err.to_string(),
            })?;
        Ok(TransportResponse { body, status })
    }
}

fn classify(url: &str, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            detail: err.to_string(),
        }
    } else {
        TransportError::Other {
            detail: err.to_string(),
        }
    }
}
