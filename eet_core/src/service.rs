// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Service-endpoint selection.
//!
//! Resolution is pure path computation; nothing here touches the network.

/// Production registration endpoint.
pub const PRODUCTION_URL: &str = "https://prod.eet.cz/eet/services/EETServiceSOAP/v3";

/// Playground (test) registration endpoint.
pub const PLAYGROUND_URL: &str = "https://pg.eet.cz/eet/services/EETServiceSOAP/v3";

/// SOAP action of the sale-registration operation.
pub const REGISTER_SALE_ACTION: &str = "http://fs.mfcr.cz/eet/OdeslaniTrzby";

/// Symbolic service selector accepted at construction and by the setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Service {
    Production,
    Playground,
    /// Arbitrary caller-supplied endpoint, for tests and custom deployments.
    Custom(String),
}

/// Which of the built-in services an endpoint resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EndpointKind {
    Production,
    Playground,
    Custom,
}

/// A resolved transport endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    kind: EndpointKind,
    url: String,
}

impl ServiceEndpoint {
    pub fn production() -> Self {
        Self {
            kind: EndpointKind::Production,
            url: PRODUCTION_URL.to_string(),
        }
    }

    pub fn playground() -> Self {
        Self {
            kind: EndpointKind::Playground,
            url: PLAYGROUND_URL.to_string(),
        }
    }

    /// A caller-supplied path, returned unchanged by [`Self::url`].
    pub fn custom(url: impl Into<String>) -> Self {
        Self {
            kind: EndpointKind::Custom,
            url: url.into(),
        }
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl From<Service> for ServiceEndpoint {
    fn from(service: Service) -> Self {
        match service {
            Service::Production => Self::production(),
            Service::Playground => Self::playground(),
            Service::Custom(url) => Self::custom(url),
        }
    }
}
