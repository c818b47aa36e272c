// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Registration payload rendering.

use chrono::{DateTime, Utc};
use eet_receipt::{format, Receipt};
use eet_signing::{SecurityCodes, SigningError};
use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use super::{security, EET_NS, SOAP_NS, WSU_NS};
use crate::certificate::Certificate;

/// Errors raised while rendering a payload.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("cannot render registration payload: {detail}")]
    Render { detail: String },
    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Per-message metadata that is not part of the receipt itself.
#[derive(Debug, Clone, Copy)]
pub struct MessageHeader {
    /// Send time, carried in the message header attribute.
    pub sent_at: DateTime<Utc>,
    /// True for a verification-mode (trial) submission.
    pub verification: bool,
}

/// Renders the complete SOAP envelope for one registration message.
///
/// The body carries the sale record and the control codes; the header
/// carries the holder's security token and a signature over the exact body
/// bytes as rendered here.
pub fn registration_payload(
    receipt: &Receipt,
    codes: &SecurityCodes,
    header: &MessageHeader,
    certificate: &Certificate,
) -> Result<String, PayloadError> {
    let sale = render_sale(receipt, codes, header)?;
    let body = format!(
        r#"<soapenv:Body xmlns:soapenv="{SOAP_NS}" xmlns:wsu="{WSU_NS}" wsu:Id="Body">{sale}</soapenv:Body>"#
    );
    let security = security::security_header(body.as_bytes(), certificate)?;
    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="{SOAP_NS}"><soapenv:Header>{security}</soapenv:Header>{body}</soapenv:Envelope>"#
    ))
}

fn render_sale(
    receipt: &Receipt,
    codes: &SecurityCodes,
    header: &MessageHeader,
) -> Result<String, PayloadError> {
    let mut writer = Writer::new(Vec::new());

    let mut sale = BytesStart::new("eet:Trzba");
    sale.push_attribute(("xmlns:eet", EET_NS));
    writer.write_event(Event::Start(sale)).map_err(render_error)?;

    let mut head = BytesStart::new("eet:Hlavicka");
    head.push_attribute(("uuid_zpravy", receipt.message_uuid.to_string().as_str()));
    head.push_attribute((
        "dat_odesl",
        format::timestamp(&header.sent_at.fixed_offset()).as_str(),
    ));
    head.push_attribute(("prvni_zaslani", format::flag(receipt.first_attempt)));
    head.push_attribute(("overeni", format::flag(header.verification)));
    writer.write_event(Event::Empty(head)).map_err(render_error)?;

    let mut data = BytesStart::new("eet:Data");
    data.push_attribute(("dic_popl", receipt.tax_id.as_str()));
    if let Some(delegate) = &receipt.delegate_tax_id {
        data.push_attribute(("dic_poverujiciho", delegate.as_str()));
    }
    data.push_attribute(("id_provoz", receipt.premise_id.to_string().as_str()));
    data.push_attribute(("id_pokl", receipt.register_id.as_str()));
    data.push_attribute(("porad_cis", receipt.sequence_number.as_str()));
    data.push_attribute(("dat_trzby", format::timestamp(&receipt.issued_at).as_str()));
    data.push_attribute(("celk_trzba", format::amount(receipt.total).as_str()));
    for (name, value) in vat_wire_attributes(receipt) {
        data.push_attribute((name, value.as_str()));
    }
    data.push_attribute(("rezim", receipt.mode.wire_code().to_string().as_str()));
    writer.write_event(Event::Empty(data)).map_err(render_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("eet:KontrolniKody")))
        .map_err(render_error)?;

    let mut pkp = BytesStart::new("eet:pkp");
    pkp.push_attribute(("digest", "SHA256"));
    pkp.push_attribute(("cipher", "RSA2048"));
    pkp.push_attribute(("encoding", "base64"));
    writer.write_event(Event::Start(pkp)).map_err(render_error)?;
    writer
        .write_event(Event::Text(BytesText::new(&codes.pkp_base64())))
        .map_err(render_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("eet:pkp")))
        .map_err(render_error)?;

    let mut bkp = BytesStart::new("eet:bkp");
    bkp.push_attribute(("digest", "SHA1"));
    bkp.push_attribute(("encoding", "base16"));
    writer.write_event(Event::Start(bkp)).map_err(render_error)?;
    writer
        .write_event(Event::Text(BytesText::new(codes.bkp())))
        .map_err(render_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("eet:bkp")))
        .map_err(render_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("eet:KontrolniKody")))
        .map_err(render_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("eet:Trzba")))
        .map_err(render_error)?;

    String::from_utf8(writer.into_inner()).map_err(render_error)
}

// Wire attribute names of the optional VAT breakdown, schema order.
fn vat_wire_attributes(receipt: &Receipt) -> Vec<(&'static str, String)> {
    [
        ("zakl_nepodl_dph", receipt.exempt_amount),
        ("zakl_dan1", receipt.standard_base),
        ("dan1", receipt.standard_tax),
        ("zakl_dan2", receipt.first_reduced_base),
        ("dan2", receipt.first_reduced_tax),
        ("zakl_dan3", receipt.second_reduced_base),
        ("dan3", receipt.second_reduced_tax),
        ("cest_sluz", receipt.travel_service),
        ("pouzit_zboz1", receipt.used_goods_standard),
        ("pouzit_zboz2", receipt.used_goods_first_reduced),
        ("pouzit_zboz3", receipt.used_goods_second_reduced),
        ("urceno_cerp_zuct", receipt.settlement_credit),
        ("cerp_zuct", receipt.settlement_drawdown),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|amount| (name, format::amount(amount))))
    .collect()
}

fn render_error(err: impl std::fmt::Display) -> PayloadError {
    PayloadError::Render {
        detail: err.to_string(),
    }
}
