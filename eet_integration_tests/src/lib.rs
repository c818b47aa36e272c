// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests for the EET registration client.
//!
//! The scenarios live in `tests/`: a dispatcher over the real HTTP transport
//! is driven against an in-process mock of the registration service.
