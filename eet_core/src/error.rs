// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use eet_receipt::{Receipt, ReceiptError};
use eet_signing::{SecurityCodes, SigningError};

use crate::{
    certificate::CertificateError,
    soap::{PayloadError, ReplyError},
    transport::TransportError,
};

/// Everything that can go wrong between a receipt and its confirmation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Required receipt field missing or malformed; a caller bug, not
    /// retryable.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
    /// Key material cannot sign; fatal until the dispatcher is
    /// reconfigured.
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Certificate(#[from] CertificateError),
    /// Network-level failure; retryable at the caller's discretion.
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
    /// Well-formed answer rejecting the receipt; requires receipt
    /// correction, not a blind retry.
    #[error("registration rejected by the service (code {code}): {message}")]
    Rejected { code: i64, message: String, test: bool },
    #[error("service returned a SOAP fault ({code}): {reason}")]
    Fault { code: String, reason: String },
}

/// Uniform envelope for any send failure.
///
/// Carries the receipt and the locally derived codes: those were computed
/// before the transport call, so they remain valid proof-of-attempt even
/// when the service never answered.
#[derive(thiserror::Error, Debug)]
#[error("receipt was not registered: {source}")]
pub struct ClientError {
    receipt: Receipt,
    pkp: Option<Vec<u8>>,
    bkp: Option<String>,
    #[source]
    source: Error,
}

impl ClientError {
    pub(crate) fn new(receipt: Receipt, codes: Option<&SecurityCodes>, source: Error) -> Self {
        Self {
            receipt,
            pkp: codes.map(|codes| codes.pkp().to_vec()),
            bkp: codes.map(|codes| codes.bkp().to_string()),
            source,
        }
    }

    /// The receipt whose registration failed.
    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    /// Raw signature code, when derivation got that far.
    pub fn pkp(&self) -> Option<&[u8]> {
        self.pkp.as_deref()
    }

    /// Base64 rendering of [`Self::pkp`].
    pub fn pkp_base64(&self) -> Option<String> {
        self.pkp.as_ref().map(|pkp| BASE64.encode(pkp))
    }

    /// Security code, when derivation got that far.
    pub fn bkp(&self) -> Option<&str> {
        self.bkp.as_deref()
    }

    /// The underlying failure.
    pub fn cause(&self) -> &Error {
        &self.source
    }

    /// True when resubmitting the same receipt may succeed without
    /// correcting it first.
    pub fn is_retryable(&self) -> bool {
        matches!(self.source, Error::Transport(_))
    }
}
