// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Registration response parsing.

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use serde::{Deserialize, Serialize};

/// Errors raised while interpreting a response body.
#[derive(thiserror::Error, Debug)]
pub enum ReplyError {
    #[error("malformed registration response: {detail}")]
    Malformed { detail: String },
    #[error("response carries no confirmation, rejection, or fault")]
    Empty,
}

/// Header echoed by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyHeader {
    /// Message UUID of the request this reply answers.
    pub message_uuid: Option<String>,
    /// BKP as recomputed by the service.
    pub bkp: Option<String>,
    /// Receive time at the service.
    pub received_at: Option<String>,
}

/// Outcome element of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyBody {
    /// The receipt was registered and assigned a FIK.
    Confirmation { fik: String, test: bool },
    /// A well-formed answer rejecting the receipt.
    Rejection { code: i64, message: String, test: bool },
    /// SOAP-level fault.
    Fault { code: String, reason: String },
}

/// Non-fatal warning attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: i64,
    pub message: String,
}

/// Parsed registration response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReply {
    pub header: ReplyHeader,
    pub body: ReplyBody,
    pub warnings: Vec<Warning>,
}

// Which element's text content is being collected.
enum Collecting {
    Nothing,
    Rejection,
    Warning,
    FaultCode,
    FaultReason,
}

/// Parses a raw response body.
///
/// Elements are matched by local name; the service is the only party that
/// speaks this schema, so namespace prefixes carry no information here.
pub fn parse_reply(body: &str) -> Result<RegistrationReply, ReplyError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut header = ReplyHeader::default();
    let mut outcome: Option<ReplyBody> = None;
    let mut warnings: Vec<Warning> = Vec::new();
    let mut fault_code = String::new();
    let mut fault_reason = String::new();
    let mut collecting = Collecting::Nothing;

    loop {
        match reader.read_event() {
            Err(err) => return Err(malformed(err)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(element)) => {
                collecting = handle_element(
                    &element,
                    &mut header,
                    &mut outcome,
                    &mut warnings,
                )?;
            }
            Ok(Event::Empty(element)) => {
                handle_element(&element, &mut header, &mut outcome, &mut warnings)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(malformed)?.into_owned();
                match collecting {
                    Collecting::Rejection => {
                        if let Some(ReplyBody::Rejection { message, .. }) = outcome.as_mut() {
                            *message = text;
                        }
                    }
                    Collecting::Warning => {
                        if let Some(warning) = warnings.last_mut() {
                            warning.message = text;
                        }
                    }
                    Collecting::FaultCode => fault_code = text,
                    Collecting::FaultReason => fault_reason = text,
                    Collecting::Nothing => {}
                }
            }
            Ok(Event::End(_)) => collecting = Collecting::Nothing,
            Ok(_) => {}
        }
    }

    let body = match outcome {
        Some(body) => body,
        None if !fault_reason.is_empty() || !fault_code.is_empty() => ReplyBody::Fault {
            code: fault_code,
            reason: fault_reason,
        },
        None => return Err(ReplyError::Empty),
    };

    Ok(RegistrationReply {
        header,
        body,
        warnings,
    })
}

fn handle_element(
    element: &BytesStart,
    header: &mut ReplyHeader,
    outcome: &mut Option<ReplyBody>,
    warnings: &mut Vec<Warning>,
) -> Result<Collecting, ReplyError> {
    match element.local_name().as_ref() {
        b"Hlavicka" => {
            header.message_uuid = attribute(element, "uuid_zpravy")?;
            header.bkp = attribute(element, "bkp")?;
            header.received_at = attribute(element, "dat_prij")?;
            Ok(Collecting::Nothing)
        }
        b"Potvrzeni" => {
            let fik = attribute(element, "fik")?.ok_or(ReplyError::Malformed {
                detail: "confirmation without a fik attribute".to_string(),
            })?;
            *outcome = Some(ReplyBody::Confirmation {
                fik,
                test: flag(element, "test")?,
            });
            Ok(Collecting::Nothing)
        }
        b"Chyba" => {
            let code = attribute(element, "kod")?
                .ok_or(ReplyError::Malformed {
                    detail: "rejection without a kod attribute".to_string(),
                })?
                .parse::<i64>()
                .map_err(malformed)?;
            *outcome = Some(ReplyBody::Rejection {
                code,
                message: String::new(),
                test: flag(element, "test")?,
            });
            Ok(Collecting::Rejection)
        }
        b"Varovani" => {
            let code = attribute(element, "kod_varov")?
                .ok_or(ReplyError::Malformed {
                    detail: "warning without a kod_varov attribute".to_string(),
                })?
                .parse::<i64>()
                .map_err(malformed)?;
            warnings.push(Warning {
                code,
                message: String::new(),
            });
            Ok(Collecting::Warning)
        }
        b"faultcode" => Ok(Collecting::FaultCode),
        b"faultstring" => Ok(Collecting::FaultReason),
        _ => Ok(Collecting::Nothing),
    }
}

fn attribute(element: &BytesStart, name: &str) -> Result<Option<String>, ReplyError> {
    for attr in element.attributes() {
        let attr = attr.map_err(malformed)?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value().map_err(malformed)?.into_owned()));
        }
    }
    Ok(None)
}

fn flag(element: &BytesStart, name: &str) -> Result<bool, ReplyError> {
    Ok(attribute(element, name)?.as_deref() == Some("true"))
}

fn malformed(err: impl std::fmt::Display) -> ReplyError {
    ReplyError::Malformed {
        detail: err.to_string(),
    }
}
