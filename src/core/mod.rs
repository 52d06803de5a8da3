// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout the crate.
//!
//! - [`CdrError`] - error taxonomy for decode/encode failures
//! - [`Result`] - crate-wide result alias

pub mod error;

pub use error::{CdrError, Result};
