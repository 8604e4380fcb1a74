#![forbid(unsafe_code)]

//! Runtime mode definitions for Strict (fftpack-compatible) and Hardened operation.

use serde::{Deserialize, Serialize};

/// Operational mode governing compatibility/safety trade-offs.
///
/// - **Strict**: Match the fftpack dispatch behavior as closely as possible;
///   validation stops at what fftpack rejected.
/// - **Hardened**: Extra safety layer beyond the reference; adds finite-check
///   rejection of NaN/Inf elements before any kernel runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeMode {
    Strict,
    Hardened,
}
