// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Engine error types.
//!
//! Every fallible engine call fails closed: when one of these is returned
//! the annotation map, label pool and viewport are left as they were.

use thiserror::Error;

/// Errors surfaced by the viewport and annotation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The operation needs a precondition that does not hold yet, e.g.
    /// zooming before the media intrinsic size is known.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The input was refused; the caller may prompt again.
    #[error("Rejected input: {0}")]
    RejectedInput(String),
}

impl EngineError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::RejectedInput(msg.into())
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
