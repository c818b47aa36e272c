// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! # EET registration client core
//!
//! The [`Dispatcher`] is the primary interface of this crate: bound to a
//! holder [`Certificate`] and a [`Service`] endpoint, it signs a sale
//! receipt, derives the PKP/BKP security codes, submits the registration
//! payload over a [`transport::RegistrationTransport`] and interprets the
//! service's answer.
//!
//! Every send failure surfaces as a [`ClientError`] that carries the receipt
//! and the locally derived codes: the codes are computed before the network
//! round-trip, so the caller keeps an auditable proof-of-attempt even when
//! no confirmation was received.

pub mod certificate;
pub mod dispatcher;
pub mod service;
pub mod soap;
pub mod transport;

mod error;

pub use certificate::{Certificate, CertificateError};
pub use dispatcher::{DispatchResult, DispatchState, Dispatcher};
pub use error::{ClientError, Error};
pub use service::{Service, ServiceEndpoint};
pub use soap::Warning;
pub use transport::{
    HttpTransport, RegistrationTransport, TransportError, TransportOptions, TransportResponse,
};

/// Result type for dispatch-adjacent operations.
pub type Result<T> = std::result::Result<T, Error>;
