// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire encodings shared by the signature plaintext and the SOAP payload.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use rust_decimal::Decimal;

/// RFC 3339 with whole seconds and a numeric offset, as the protocol fixes
/// for sale timestamps.
pub fn timestamp(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Decimal amount with exactly two fraction digits.
pub fn amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Lowercase boolean, as carried in payload attributes.
pub fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
