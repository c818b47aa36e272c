// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, FixedOffset};
use eet_signing::CanonicalForm;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{format, ReceiptError, ReceiptResult};

/// Registration regime of a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Standard online registration.
    #[default]
    Regular,
    /// Simplified regime for premises without a reliable connection.
    Simplified,
}

impl Mode {
    /// Numeric code carried on the wire.
    pub fn wire_code(self) -> u8 {
        match self {
            Self::Regular => 0,
            Self::Simplified => 1,
        }
    }
}

/// One fiscal sale record.
///
/// The required fields identify the sale and enter the signature plaintext;
/// the optional amounts are the VAT breakdown the registration service
/// accepts alongside the total. `bkp`/`pkp` hold previously derived codes
/// for local verification only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique id of the registration message, generated per receipt.
    pub message_uuid: Uuid,
    /// Seller tax id, `CZ` followed by 8-10 digits.
    pub tax_id: String,
    /// Tax id of the delegating seller, for sales registered on behalf of
    /// another taxpayer.
    pub delegate_tax_id: Option<String>,
    /// Premise id assigned by the tax authority, 1-999999.
    pub premise_id: u32,
    /// Cash register designation within the premise.
    pub register_id: String,
    /// Receipt sequence number issued by the register.
    pub sequence_number: String,
    /// Time of the sale, with the local UTC offset.
    pub issued_at: DateTime<FixedOffset>,
    /// Total amount of the sale; negative for refunds.
    pub total: Decimal,

    /// Amount exempt from VAT.
    pub exempt_amount: Option<Decimal>,
    /// Base amount at the standard VAT rate.
    pub standard_base: Option<Decimal>,
    /// VAT at the standard rate.
    pub standard_tax: Option<Decimal>,
    /// Base amount at the first reduced VAT rate.
    pub first_reduced_base: Option<Decimal>,
    /// VAT at the first reduced rate.
    pub first_reduced_tax: Option<Decimal>,
    /// Base amount at the second reduced VAT rate.
    pub second_reduced_base: Option<Decimal>,
    /// VAT at the second reduced rate.
    pub second_reduced_tax: Option<Decimal>,
    /// Amount under the travel-service VAT scheme.
    pub travel_service: Option<Decimal>,
    /// Used-goods amount at the standard rate.
    pub used_goods_standard: Option<Decimal>,
    /// Used-goods amount at the first reduced rate.
    pub used_goods_first_reduced: Option<Decimal>,
    /// Used-goods amount at the second reduced rate.
    pub used_goods_second_reduced: Option<Decimal>,
    /// Amount collected for later drawdown (deposits, vouchers).
    pub settlement_credit: Option<Decimal>,
    /// Amount drawn from a previously collected credit.
    pub settlement_drawdown: Option<Decimal>,

    /// Registration regime.
    pub mode: Mode,
    /// False when this record is a resubmission of an earlier attempt.
    pub first_attempt: bool,

    /// Previously derived security code, kept for local verification.
    pub bkp: Option<String>,
    /// Previously derived signature code, kept for local verification.
    pub pkp: Option<Vec<u8>>,
}

impl Receipt {
    /// Returns a receipt for the given sale with a freshly generated message
    /// UUID and no optional amounts.
    pub fn new(
        tax_id: impl Into<String>,
        premise_id: u32,
        register_id: impl Into<String>,
        sequence_number: impl Into<String>,
        issued_at: DateTime<FixedOffset>,
        total: Decimal,
    ) -> Self {
        Self {
            message_uuid: Uuid::new_v4(),
            tax_id: tax_id.into(),
            delegate_tax_id: None,
            premise_id,
            register_id: register_id.into(),
            sequence_number: sequence_number.into(),
            issued_at,
            total,
            exempt_amount: None,
            standard_base: None,
            standard_tax: None,
            first_reduced_base: None,
            first_reduced_tax: None,
            second_reduced_base: None,
            second_reduced_tax: None,
            travel_service: None,
            used_goods_standard: None,
            used_goods_first_reduced: None,
            used_goods_second_reduced: None,
            settlement_credit: None,
            settlement_drawdown: None,
            mode: Mode::default(),
            first_attempt: true,
            bkp: None,
            pkp: None,
        }
    }

    /// Checks that every required field is present and matches the protocol
    /// format before a code can be derived or a payload rendered.
    pub fn validate(&self) -> ReceiptResult<()> {
        if self.message_uuid.is_nil() {
            return Err(ReceiptError::MissingField {
                field: "message_uuid",
            });
        }
        check_tax_id("tax_id", &self.tax_id)?;
        if let Some(delegate) = &self.delegate_tax_id {
            check_tax_id("delegate_tax_id", delegate)?;
        }
        if !(1..=999_999).contains(&self.premise_id) {
            return Err(ReceiptError::InvalidField {
                field: "premise_id",
                value: self.premise_id.to_string(),
            });
        }
        check_device_string("register_id", &self.register_id, 20)?;
        check_device_string("sequence_number", &self.sequence_number, 25)?;
        check_amount("total", self.total)?;
        for (field, value) in self.vat_breakdown() {
            if let Some(value) = value {
                check_amount(field, value)?;
            }
        }
        Ok(())
    }

    /// Optional amounts in wire order, paired with their field names.
    pub fn vat_breakdown(&self) -> [(&'static str, Option<Decimal>); 13] {
        [
            ("exempt_amount", self.exempt_amount),
            ("standard_base", self.standard_base),
            ("standard_tax", self.standard_tax),
            ("first_reduced_base", self.first_reduced_base),
            ("first_reduced_tax", self.first_reduced_tax),
            ("second_reduced_base", self.second_reduced_base),
            ("second_reduced_tax", self.second_reduced_tax),
            ("travel_service", self.travel_service),
            ("used_goods_standard", self.used_goods_standard),
            ("used_goods_first_reduced", self.used_goods_first_reduced),
            ("used_goods_second_reduced", self.used_goods_second_reduced),
            ("settlement_credit", self.settlement_credit),
            ("settlement_drawdown", self.settlement_drawdown),
        ]
    }
}

impl CanonicalForm for Receipt {
    /// Protocol-fixed concatenation the PKP signature is computed over.
    fn canonical_plaintext(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.tax_id,
            self.premise_id,
            self.register_id,
            self.sequence_number,
            format::timestamp(&self.issued_at),
            format::amount(self.total),
        )
    }
}

fn check_tax_id(field: &'static str, value: &str) -> ReceiptResult<()> {
    if value.is_empty() {
        return Err(ReceiptError::MissingField { field });
    }
    let digits = value.strip_prefix("CZ").unwrap_or("");
    let digits_ok =
        (8..=10).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if !digits_ok {
        return Err(ReceiptError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

// Registers and sequence numbers share one schema alphabet.
fn check_device_string(field: &'static str, value: &str, max_len: usize) -> ReceiptResult<()> {
    if value.is_empty() {
        return Err(ReceiptError::MissingField { field });
    }
    let charset_ok = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ".,:;/#-_ ".contains(c));
    if value.len() > max_len || !charset_ok {
        return Err(ReceiptError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_amount(field: &'static str, value: Decimal) -> ReceiptResult<()> {
    if value.round_dp(2) != value {
        return Err(ReceiptError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use rstest::*;
    use rust_decimal_macros::dec;

    use super::*;

    fn issued_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2019-08-11T15:36:14+02:00").unwrap()
    }

    #[fixture]
    fn receipt() -> Receipt {
        Receipt::new(
            "CZ00000019",
            141,
            "1patro-vpravo",
            "141-18543-05",
            issued_at(),
            dec!(236.00),
        )
    }

    #[rstest]
    fn canonical_plaintext_matches_wire_form(receipt: Receipt) {
        assert_eq!(
            receipt.canonical_plaintext(),
            "CZ00000019|141|1patro-vpravo|141-18543-05|2019-08-11T15:36:14+02:00|236.00"
        );
    }

    #[rstest]
    fn new_receipt_is_valid(receipt: Receipt) {
        assert!(receipt.validate().is_ok());
        assert!(receipt.bkp.is_none() && receipt.pkp.is_none());
        assert!(receipt.first_attempt);
    }

    #[rstest]
    fn message_uuids_are_unique(#[from(receipt)] first: Receipt, #[from(receipt)] second: Receipt) {
        assert_ne!(first.message_uuid, second.message_uuid);
    }

    #[rstest]
    #[case::bad_tax_id_prefix("DE00000019")]
    #[case::bad_tax_id_digits("CZ0000001")]
    #[case::bad_tax_id_letters("CZ0000001x")]
    fn malformed_tax_id_is_rejected(mut receipt: Receipt, #[case] tax_id: &str) {
        receipt.tax_id = tax_id.to_string();
        assert!(matches!(
            receipt.validate(),
            Err(ReceiptError::InvalidField { field: "tax_id", .. })
        ));
    }

    #[rstest]
    fn empty_tax_id_is_a_missing_field(mut receipt: Receipt) {
        receipt.tax_id.clear();
        assert_eq!(
            receipt.validate(),
            Err(ReceiptError::MissingField { field: "tax_id" })
        );
    }

    #[rstest]
    #[case::zero(0)]
    #[case::too_large(1_000_000)]
    fn premise_id_out_of_range_is_rejected(mut receipt: Receipt, #[case] premise_id: u32) {
        receipt.premise_id = premise_id;
        assert!(matches!(
            receipt.validate(),
            Err(ReceiptError::InvalidField {
                field: "premise_id",
                ..
            })
        ));
    }

    #[rstest]
    fn register_id_alphabet_is_enforced(mut receipt: Receipt) {
        receipt.register_id = "pokladna!".to_string();
        assert!(matches!(
            receipt.validate(),
            Err(ReceiptError::InvalidField {
                field: "register_id",
                ..
            })
        ));
    }

    #[rstest]
    fn sequence_number_length_is_enforced(mut receipt: Receipt) {
        receipt.sequence_number = "0".repeat(26);
        assert!(matches!(
            receipt.validate(),
            Err(ReceiptError::InvalidField {
                field: "sequence_number",
                ..
            })
        ));
    }

    #[rstest]
    fn sub_cent_total_is_rejected(mut receipt: Receipt) {
        receipt.total = dec!(10.005);
        assert!(matches!(
            receipt.validate(),
            Err(ReceiptError::InvalidField { field: "total", .. })
        ));
    }

    #[rstest]
    fn vat_breakdown_amounts_are_checked(mut receipt: Receipt) {
        receipt.standard_base = Some(dec!(100.00));
        receipt.standard_tax = Some(dec!(21.0001));
        assert!(matches!(
            receipt.validate(),
            Err(ReceiptError::InvalidField {
                field: "standard_tax",
                ..
            })
        ));
    }

    #[rstest]
    fn refund_totals_are_allowed(mut receipt: Receipt) {
        receipt.total = dec!(-236.00);
        assert!(receipt.validate().is_ok());
        assert!(receipt.canonical_plaintext().ends_with("|-236.00"));
    }

    #[test]
    fn amount_formatting_pads_and_rounds() {
        assert_eq!(format::amount(dec!(500)), "500.00");
        assert_eq!(format::amount(dec!(0.1)), "0.10");
        assert_eq!(format::amount(dec!(-12.5)), "-12.50");
    }

    #[test]
    fn timestamp_formatting_keeps_the_offset() {
        assert_eq!(format::timestamp(&issued_at()), "2019-08-11T15:36:14+02:00");
    }
}
