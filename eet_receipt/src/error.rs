// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

/// Error type for receipts
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("required field `{field}` is missing or empty")]
    MissingField { field: &'static str },
    #[error("field `{field}` is malformed: `{value}`")]
    InvalidField { field: &'static str, value: String },
}
