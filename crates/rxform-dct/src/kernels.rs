#![forbid(unsafe_code)]

//! Kernel handles and reference kernels for the DCT dispatch table.
//!
//! Six handles exist, one per (variant, precision) pair, each a
//! process-lifetime static resolved by [`DctElement::kernel_for`]. The
//! shipped kernels are naive O(N^2) summations over the precomputed cosine
//! tables; they exist to pin down the transform contracts exactly, and any
//! faster backend replaces them behind [`CosineKernel`] without touching
//! dispatch.

use std::f64::consts::FRAC_1_SQRT_2;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Mul, Neg};

use crate::Normalization;
use crate::cache::CosineTable;
use crate::{Precision, TransformKind};

/// Name reported by the startup probe for the linked kernel backend.
pub const BACKEND_NAME: &str = "naive-cosine";

/// Version string of the linked kernel backend.
#[must_use]
pub fn backend_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Element precisions the kernel table is populated for.
///
/// The trait is sealed: the two floating-point precisions are the whole
/// domain, so an unsupported element type is a compile error rather than a
/// runtime probe.
pub trait DctElement:
    sealed::Sealed
    + Copy
    + PartialEq
    + Add<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    const PRECISION: Precision;

    fn from_f64(value: f64) -> Self;
    fn is_finite_value(self) -> bool;

    /// Direct lookup into the fixed table of kernel handles; no fallback or
    /// coercion between precisions.
    fn kernel_for(kind: TransformKind) -> &'static dyn CosineKernel<Self>;
}

impl DctElement for f64 {
    const PRECISION: Precision = Precision::Double;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn is_finite_value(self) -> bool {
        self.is_finite()
    }

    fn kernel_for(kind: TransformKind) -> &'static dyn CosineKernel<Self> {
        match kind {
            TransformKind::Dct1 => &DCT1_DOUBLE,
            TransformKind::Dct2 => &DCT2_DOUBLE,
            TransformKind::Dct3 => &DCT3_DOUBLE,
        }
    }
}

impl DctElement for f32 {
    const PRECISION: Precision = Precision::Single;

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn is_finite_value(self) -> bool {
        self.is_finite()
    }

    fn kernel_for(kind: TransformKind) -> &'static dyn CosineKernel<Self> {
        match kind {
            TransformKind::Dct1 => &DCT1_SINGLE,
            TransformKind::Dct2 => &DCT2_SINGLE,
            TransformKind::Dct3 => &DCT3_SINGLE,
        }
    }
}

/// One kernel entry point: transforms contiguous rows in place, always along
/// the innermost axis. Axis bookkeeping lives with the dispatcher.
pub trait CosineKernel<T: DctElement>: Sync {
    fn kind(&self) -> TransformKind;

    /// Transform one row in place using the table for `(self.kind(), row.len())`.
    fn execute(&self, row: &mut [T], table: &CosineTable, normalization: Normalization);
}

/// Reference kernel: direct summation against the cached cosine table.
#[derive(Debug)]
pub struct NaiveCosineKernel<T> {
    kind: TransformKind,
    _precision: PhantomData<T>,
}

impl<T> NaiveCosineKernel<T> {
    const fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            _precision: PhantomData,
        }
    }
}

impl<T: DctElement> CosineKernel<T> for NaiveCosineKernel<T> {
    fn kind(&self) -> TransformKind {
        self.kind
    }

    fn execute(&self, row: &mut [T], table: &CosineTable, normalization: Normalization) {
        match self.kind {
            TransformKind::Dct1 => dct1_row(row, table, normalization),
            TransformKind::Dct2 => dct2_row(row, table, normalization),
            TransformKind::Dct3 => dct3_row(row, table, normalization),
        }
    }
}

// The fixed table of kernel handles: 2 precisions x 3 variants.
static DCT1_SINGLE: NaiveCosineKernel<f32> = NaiveCosineKernel::new(TransformKind::Dct1);
static DCT2_SINGLE: NaiveCosineKernel<f32> = NaiveCosineKernel::new(TransformKind::Dct2);
static DCT3_SINGLE: NaiveCosineKernel<f32> = NaiveCosineKernel::new(TransformKind::Dct3);
static DCT1_DOUBLE: NaiveCosineKernel<f64> = NaiveCosineKernel::new(TransformKind::Dct1);
static DCT2_DOUBLE: NaiveCosineKernel<f64> = NaiveCosineKernel::new(TransformKind::Dct2);
static DCT3_DOUBLE: NaiveCosineKernel<f64> = NaiveCosineKernel::new(TransformKind::Dct3);

/// DCT-II: `y[k] = 2 * sum_n x[n] * cos(pi * k * (2n+1) / (2N))`.
///
/// The cosine argument index `k * (2n+1)` is tracked incrementally modulo the
/// table period, so no index product is ever formed.
fn dct2_row<T: DctElement>(row: &mut [T], table: &CosineTable, normalization: Normalization) {
    let n = row.len();
    let period = table.period();
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let step = (2 * k) % period;
        let mut m = k % period;
        let mut acc = T::from_f64(0.0);
        for &x in row.iter() {
            acc += x * T::from_f64(table.at(m));
            m += step;
            if m >= period {
                m -= period;
            }
        }
        let value = match normalization {
            Normalization::Unnormalized => T::from_f64(2.0) * acc,
            Normalization::Ortho => {
                let f = if k == 0 {
                    (1.0 / (4.0 * n as f64)).sqrt()
                } else {
                    (1.0 / (2.0 * n as f64)).sqrt()
                };
                T::from_f64(2.0 * f) * acc
            }
        };
        out.push(value);
    }
    row.copy_from_slice(&out);
}

/// DCT-III: `y[k] = x[0] + 2 * sum_{n>=1} x[n] * cos(pi * (k+0.5) * n / N)`,
/// or with ortho scaling `y[k] = x[0]/sqrt(N) + sqrt(1/N) * sum_{n>=1} ...`.
///
/// Unnormalized DCT-III inverts unnormalized DCT-II up to a factor `2N`; the
/// ortho pair is an exact inverse.
fn dct3_row<T: DctElement>(row: &mut [T], table: &CosineTable, normalization: Normalization) {
    let n = row.len();
    let period = table.period();
    let x0 = row[0];
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let step = (2 * k + 1) % period;
        let mut m = step;
        let mut acc = T::from_f64(0.0);
        for &x in row.iter().skip(1) {
            acc += x * T::from_f64(table.at(m));
            m += step;
            if m >= period {
                m -= period;
            }
        }
        let value = match normalization {
            Normalization::Unnormalized => x0 + T::from_f64(2.0) * acc,
            Normalization::Ortho => {
                let inv_sqrt_n = (1.0 / n as f64).sqrt();
                x0 * T::from_f64(inv_sqrt_n) + T::from_f64(inv_sqrt_n) * acc
            }
        };
        out.push(value);
    }
    row.copy_from_slice(&out);
}

/// DCT-I: `y[k] = x[0] + (-1)^k * x[N-1] + 2 * sum_{n=1}^{N-2} x[n] * cos(pi*n*k/(N-1))`.
///
/// The ortho form is the symmetric orthonormal type-I matrix (endpoint
/// weights `1/sqrt(2)`, global scale `sqrt(2/(N-1))`), its own inverse.
/// Requires `N >= 2`; enforced by validation and table construction.
fn dct1_row<T: DctElement>(row: &mut [T], table: &CosineTable, normalization: Normalization) {
    let n = row.len();
    let period = table.period();
    let x0 = row[0];
    let x_last = row[n - 1];
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let step = k % period;
        let mut m = step;
        let mut acc = T::from_f64(0.0);
        for &x in row[1..n - 1].iter() {
            acc += x * T::from_f64(table.at(m));
            m += step;
            if m >= period {
                m -= period;
            }
        }
        let endpoint = if k % 2 == 0 { x_last } else { -x_last };
        let value = match normalization {
            Normalization::Unnormalized => x0 + endpoint + T::from_f64(2.0) * acc,
            Normalization::Ortho => {
                let edge = if k == 0 || k == n - 1 { FRAC_1_SQRT_2 } else { 1.0 };
                let scale = (2.0 / (n as f64 - 1.0)).sqrt();
                T::from_f64(scale * edge)
                    * (T::from_f64(FRAC_1_SQRT_2) * (x0 + endpoint) + acc)
            }
        };
        out.push(value);
    }
    row.copy_from_slice(&out);
}
