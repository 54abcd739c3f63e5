// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential submission and decryption/verification workflows.
//!
//! Both are implemented as methods on [`crate::client::RegistryClient`]:
//!
//! - [`submit`] - encrypt, create record, await confirmation, refresh
//! - [`reveal`] - short-circuit if verified, else decrypt, verify, refresh
//!
//! Neither workflow retries on its own. Running both against the same
//! record at the same time is not supported; callers serialize per record.

pub mod error;
pub mod reveal;
pub mod submit;

pub use error::{ClientError, SubmissionError, VerificationError};
pub use submit::{generate_record_id, sanitize_size, ValidatedRecord};
