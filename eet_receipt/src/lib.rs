// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! # EET receipt
//!
//! One fiscal sale record submitted for registration. A receipt carries the
//! identity of the sale (message UUID, premise, cash register, sequence
//! number), the seller's tax id, the sale timestamp and the currency-precise
//! amounts, plus the optional VAT breakdown the protocol accepts.
//!
//! A receipt that already stores a previously derived BKP/PKP pair is
//! treated as material to be checked against, not as something to re-sign;
//! the stored codes are never part of the transmitted sale data.
//!
//! The [`format`] module holds the wire encodings (timestamp, amount, flag)
//! shared between the signature plaintext and the registration payload, so
//! the two can never disagree.

pub mod format;

mod error;
mod receipt;

pub use error::ReceiptError;
pub use receipt::{Mode, Receipt};

/// Result type for receipt validation.
pub type ReceiptResult<T> = Result<T, ReceiptError>;
