// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! SOAP codec for the registration service.
//!
//! [`request`] renders the outbound registration payload (sale data, control
//! codes and the WS-Security header), [`response`] parses the service's
//! answer into a [`RegistrationReply`]. Wire element and attribute names are
//! fixed by the service's published v3 schema.

pub mod request;
pub mod response;

mod security;

pub use request::{registration_payload, MessageHeader, PayloadError};
pub use response::{
    parse_reply, RegistrationReply, ReplyBody, ReplyError, ReplyHeader, Warning,
};

const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const EET_NS: &str = "http://fs.mfcr.cz/eet/schema/v3";
const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";
