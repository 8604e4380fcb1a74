#![forbid(unsafe_code)]

//! Real cosine transform dispatch over precompiled-style kernel handles.
//!
//! The crate forwards DCT requests (types I-III) to one of six kernel
//! handles selected by transform variant and element precision, reordering
//! axes so kernels only ever operate on the innermost axis:
//! - module boundaries: `transforms` (dispatch + entry points), `kernels`
//!   (precision trait and the six handles), `cache` (length-keyed cosine
//!   tables with an explicit open/close lifecycle), `axis` (swap-compute-swap
//!   plumbing)
//! - kernels are naive reference backends; faster backends slot in behind
//!   [`kernels::CosineKernel`] without touching the dispatch contract

pub mod axis;
pub mod cache;
pub mod kernels;
pub mod transforms;

pub use cache::{
    CacheKey, CosineTable, KernelCache, clear_shared_kernel_cache, close_shared_kernel_cache,
    shared_kernel_cache, shared_kernel_cache_len,
};
pub use kernels::{CosineKernel, DctElement, backend_version};
pub use transforms::{
    Complex64, DctError, DctOptions, Sequence, SequenceData, TransformTrace, dct, dct1,
    dct1_along, dct2, dct2_along, dct3, dct3_along, take_transform_traces,
};

use serde::{Deserialize, Serialize};

use rxform_runtime::{StartupWarning, VersionCheck, check_backend_version};

/// DCT normalization modes matching the fftpack dispatch conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// No scaling applied; composing types II and III yields `2N * x`.
    #[default]
    Unnormalized,
    /// Orthonormal scaling; the transform matrix transpose is its inverse.
    Ortho,
}

impl Normalization {
    /// Resolve the caller-facing normalization keyword.
    ///
    /// Absence means unnormalized output; the only recognized keyword is
    /// `"ortho"`. Anything else is a domain error.
    pub fn from_keyword(keyword: Option<&str>) -> Result<Self, transforms::DctError> {
        match keyword {
            None => Ok(Self::Unnormalized),
            Some("ortho") => Ok(Self::Ortho),
            Some(other) => Err(transforms::DctError::UnknownNormalization {
                keyword: other.to_string(),
            }),
        }
    }
}

/// Transform variants wired through the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Dct1,
    Dct2,
    Dct3,
}

impl TransformKind {
    /// Resolve a runtime variant order. Only {1, 2, 3} are wired.
    pub fn from_order(order: u8) -> Result<Self, transforms::DctError> {
        match order {
            1 => Ok(Self::Dct1),
            2 => Ok(Self::Dct2),
            3 => Ok(Self::Dct3),
            other => Err(transforms::DctError::UnknownVariant { order: other }),
        }
    }

    #[must_use]
    pub const fn order(self) -> u8 {
        match self {
            Self::Dct1 => 1,
            Self::Dct2 => 2,
            Self::Dct3 => 3,
        }
    }
}

/// Element precisions the kernel table is populated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Single,
    Double,
}

/// Oldest kernel backend release the dispatch layer is validated against.
pub const MIN_SUPPORTED_BACKEND_VERSION: &str = "0.1.0";

/// Startup probe result for the linked kernel backend.
///
/// A version mismatch is advisory: the report carries a warning, never an
/// error, and transforms remain available either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub backend: &'static str,
    pub detected: String,
    pub minimum: &'static str,
    pub check: VersionCheck,
}

impl StartupReport {
    #[must_use]
    pub fn warning(&self) -> Option<StartupWarning> {
        self.check.warning()
    }

    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Probe the kernel backend version against [`MIN_SUPPORTED_BACKEND_VERSION`].
#[must_use]
pub fn startup_report() -> StartupReport {
    let detected = backend_version();
    StartupReport {
        backend: kernels::BACKEND_NAME,
        detected: detected.to_string(),
        minimum: MIN_SUPPORTED_BACKEND_VERSION,
        check: check_backend_version(detected, MIN_SUPPORTED_BACKEND_VERSION),
    }
}
