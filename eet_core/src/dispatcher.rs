// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The dispatcher: signing, submission and post-send state for one
//! certificate holder.
//!
//! One dispatcher owns its certificate, its current service endpoint and its
//! transport; receipts pass through per call. Sends are strictly sequential
//! (`&mut self`) and never retried internally: fiscal registration carries a
//! duplicate-submission risk, so resubmission is an explicit caller decision
//! (flip [`Receipt::first_attempt`] off when making it).

use chrono::{DateTime, Utc};
use eet_receipt::Receipt;
use eet_signing::SecurityCodes;
use log::{debug, info, warn};

use crate::{
    certificate::Certificate,
    error::{ClientError, Error},
    service::{Service, ServiceEndpoint, REGISTER_SALE_ACTION},
    soap::{self, MessageHeader, ReplyBody, Warning},
    transport::{HttpTransport, RegistrationTransport, TransportError, TransportOptions},
};

/// Where the dispatcher stands after its most recent send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DispatchState {
    /// No send attempted yet.
    Idle,
    /// The most recent send was confirmed.
    Sent,
    /// The most recent send failed in transport or at the service.
    Failed,
}

/// Outcome of one confirmed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    /// Server-issued confirmation code.
    pub fik: String,
    /// The code pair the receipt was signed with.
    pub codes: SecurityCodes,
    /// When the payload was handed to the transport.
    pub sent_at: DateTime<Utc>,
    /// Non-fatal warnings attached by the service; empty on a clean send.
    pub warnings: Vec<Warning>,
    /// HTTP status of the confirming response.
    pub http_status: Option<u16>,
}

/// Signs receipts and registers them against the configured service.
pub struct Dispatcher<T = HttpTransport> {
    certificate: Certificate,
    endpoint: ServiceEndpoint,
    transport: T,
    options: TransportOptions,
    state: DispatchState,
    last_receipt: Option<Receipt>,
    last_sent_at: Option<DateTime<Utc>>,
    last_result: Option<DispatchResult>,
}

impl Dispatcher<HttpTransport> {
    /// Dispatcher over the production HTTP transport.
    pub fn new(certificate: Certificate, service: Service) -> Self {
        Self::with_transport(certificate, service, HttpTransport::new())
    }
}

impl<T> Dispatcher<T>
where
    T: RegistrationTransport,
{
    /// Dispatcher over a caller-supplied transport.
    pub fn with_transport(certificate: Certificate, service: Service, transport: T) -> Self {
        Self {
            certificate,
            endpoint: service.into(),
            transport,
            options: TransportOptions::default(),
            state: DispatchState::Idle,
            last_receipt: None,
            last_sent_at: None,
            last_result: None,
        }
    }

    /// Signs `receipt` and registers it.
    ///
    /// The PKP/BKP pair is derived before the transport call and attached to
    /// any [`ClientError`] raised afterwards, so a failed attempt still
    /// leaves the caller with an auditable record. Validation and signing
    /// failures surface immediately and leave the dispatcher's state
    /// untouched; transport and service failures transition it to
    /// [`DispatchState::Failed`].
    pub async fn send(&mut self, receipt: Receipt) -> Result<DispatchResult, ClientError> {
        self.dispatch(receipt, false).await
    }

    /// Submits `receipt` in verification mode.
    ///
    /// The service processes a trial submission without registering it and
    /// answers with rejection code 0 when the receipt would have been
    /// accepted. Transport-level failures still surface as [`ClientError`].
    pub async fn verify(&mut self, receipt: Receipt) -> Result<bool, ClientError> {
        match self.dispatch(receipt, true).await {
            Ok(_) => Ok(true),
            Err(error) => match error.cause() {
                Error::Rejected { code: 0, .. } => Ok(true),
                Error::Rejected { .. } => Ok(false),
                _ => Err(error),
            },
        }
    }

    async fn dispatch(
        &mut self,
        receipt: Receipt,
        verification: bool,
    ) -> Result<DispatchResult, ClientError> {
        if let Err(error) = receipt.validate() {
            return Err(ClientError::new(receipt, None, error.into()));
        }
        let codes = match SecurityCodes::derive(&receipt, self.certificate.signing_key()) {
            Ok(codes) => codes,
            Err(error) => return Err(ClientError::new(receipt, None, error.into())),
        };

        let sent_at = Utc::now();
        let header = MessageHeader {
            sent_at,
            verification,
        };
        let payload =
            match soap::registration_payload(&receipt, &codes, &header, &self.certificate) {
                Ok(payload) => payload,
                // Rendering failed locally; nothing went over the wire, so
                // the previous state stands.
                Err(error) => return Err(ClientError::new(receipt, Some(&codes), error.into())),
            };

        self.last_receipt = Some(receipt.clone());
        self.last_sent_at = Some(sent_at);

        debug!(
            "registering receipt {} against {}",
            receipt.message_uuid,
            self.endpoint.url()
        );
        let response = match self
            .transport
            .invoke(&self.endpoint, REGISTER_SALE_ACTION, &payload, &self.options)
            .await
        {
            Ok(response) => response,
            Err(error) => return Err(self.fail(receipt, codes, error.into())),
        };

        let reply = match soap::parse_reply(&response.body) {
            Ok(reply) => reply,
            Err(error) => {
                // A non-2xx with an unreadable body is a transport-level
                // failure; a 2xx that cannot be parsed is a codec one.
                let cause = if (200..300).contains(&response.status) {
                    error.into()
                } else {
                    TransportError::Status {
                        status: response.status,
                    }
                    .into()
                };
                return Err(self.fail(receipt, codes, cause));
            }
        };

        match reply.body {
            ReplyBody::Confirmation { fik, .. } => {
                if !reply.warnings.is_empty() {
                    warn!(
                        "receipt {} registered with {} warning(s)",
                        receipt.message_uuid,
                        reply.warnings.len()
                    );
                }
                info!("receipt {} registered, fik {fik}", receipt.message_uuid);
                let result = DispatchResult {
                    fik,
                    codes,
                    sent_at,
                    warnings: reply.warnings,
                    http_status: Some(response.status),
                };
                self.state = DispatchState::Sent;
                self.last_result = Some(result.clone());
                Ok(result)
            }
            ReplyBody::Rejection {
                code,
                message,
                test,
            } => Err(self.fail(
                receipt,
                codes,
                Error::Rejected {
                    code,
                    message,
                    test,
                },
            )),
            ReplyBody::Fault { code, reason } => {
                Err(self.fail(receipt, codes, Error::Fault { code, reason }))
            }
        }
    }

    fn fail(&mut self, receipt: Receipt, codes: SecurityCodes, cause: Error) -> ClientError {
        warn!(
            "receipt {} was not registered: {cause}",
            receipt.message_uuid
        );
        self.state = DispatchState::Failed;
        ClientError::new(receipt, Some(&codes), cause)
    }

    /// Recomputes the receipt's BKP and compares it byte-for-byte against
    /// the stored BKP, else the stored PKP, else the last successfully sent
    /// pair.
    ///
    /// Returns `false` on any mismatch, on a structurally invalid receipt,
    /// and when there is nothing to compare against; verification failure is
    /// never an error.
    pub fn check(&self, receipt: &Receipt) -> bool {
        if receipt.validate().is_err() {
            return false;
        }
        let Ok(codes) = SecurityCodes::derive(receipt, self.certificate.signing_key()) else {
            return false;
        };
        if let Some(stored_bkp) = &receipt.bkp {
            return stored_bkp == codes.bkp();
        }
        if let Some(stored_pkp) = &receipt.pkp {
            return stored_pkp.as_slice() == codes.pkp();
        }
        match &self.last_result {
            Some(last) => last.codes.bkp() == codes.bkp(),
            None => false,
        }
    }

    /// Derives the receipt's code pair without sending anything.
    ///
    /// Pure: ignores any codes stored on the receipt and mutates no
    /// dispatcher state. Intended for audit and logging.
    pub fn check_codes(&self, receipt: &Receipt) -> crate::Result<SecurityCodes> {
        receipt.validate()?;
        Ok(SecurityCodes::derive(
            receipt,
            self.certificate.signing_key(),
        )?)
    }

    /// Confirmation code of the last successful send.
    pub fn fik(&self) -> Option<&str> {
        self.last_result.as_ref().map(|result| result.fik.as_str())
    }

    /// Security code of the last successful send.
    pub fn bkp(&self) -> Option<&str> {
        self.last_result.as_ref().map(|result| result.codes.bkp())
    }

    /// Signature code of the last successful send, raw bytes.
    pub fn pkp(&self) -> Option<&[u8]> {
        self.last_result.as_ref().map(|result| result.codes.pkp())
    }

    /// Signature code of the last successful send, base64.
    pub fn pkp_base64(&self) -> Option<String> {
        self.last_result
            .as_ref()
            .map(|result| result.codes.pkp_base64())
    }

    /// When the most recent attempt went out, confirmed or not.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.last_sent_at
    }

    /// Warnings of the last successful send; empty before one.
    pub fn warnings(&self) -> &[Warning] {
        self.last_result
            .as_ref()
            .map(|result| result.warnings.as_slice())
            .unwrap_or(&[])
    }

    /// Receipt of the most recent attempt, confirmed or not.
    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.last_receipt.as_ref()
    }

    /// Full outcome of the last successful send.
    pub fn last_result(&self) -> Option<&DispatchResult> {
        self.last_result.as_ref()
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.options
    }

    /// Transport tuning, handed through to the transport uninterpreted.
    pub fn transport_options_mut(&mut self) -> &mut TransportOptions {
        &mut self.options
    }

    pub fn set_service(&mut self, service: Service) {
        self.endpoint = service.into();
    }

    pub fn set_production_service(&mut self) {
        self.set_service(Service::Production);
    }

    pub fn set_playground_service(&mut self) {
        self.set_service(Service::Playground);
    }
}
