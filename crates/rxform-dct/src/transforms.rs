#![forbid(unsafe_code)]

//! Transform dispatcher and public entry points.
//!
//! A call validates its input, resolves (variant, precision) to one of the
//! six kernel handles, normalizes the transform axis to the innermost
//! position, runs the kernel row by row, and restores axis order. All
//! failures are raised before any kernel invocation; a call either returns a
//! complete transformed sequence or nothing.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use rxform_runtime::RuntimeMode;

use crate::axis::{resolve_axis, swap_axes, swapped_shape};
use crate::cache::{CacheKey, shared_kernel_cache};
use crate::kernels::DctElement;
use crate::{Normalization, Precision, TransformKind};

/// Complex element representation used by the runtime-typed surface.
///
/// Present so the dispatcher can reject complex input with the type error
/// the contract requires; no transform accepts it.
pub type Complex64 = (f64, f64);

/// Common options shared by the transform entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DctOptions {
    pub mode: RuntimeMode,
    pub normalization: Normalization,
    /// Requested output length. Anything other than the input's size along
    /// the transform axis is a hard unsupported-feature error.
    pub length: Option<usize>,
    /// Accepted for signature compatibility; the slice-based surface always
    /// allocates fresh output and never mutates caller data.
    pub overwrite_input: bool,
    pub check_finite: bool,
}

impl Default for DctOptions {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Strict,
            normalization: Normalization::Unnormalized,
            length: None,
            overwrite_input: false,
            check_finite: false,
        }
    }
}

impl DctOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: Option<usize>) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub fn with_check_finite(mut self, check_finite: bool) -> Self {
        self.check_finite = check_finite;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DctError {
    /// Input is not a real-valued sequence.
    ComplexInput,
    /// Padding/truncating to a different output length is unimplemented.
    LengthChangeUnsupported { requested: usize, actual: usize },
    UnknownVariant { order: u8 },
    UnknownNormalization { keyword: String },
    InvalidShape { detail: &'static str },
    InvalidAxis { axis: isize, rank: usize },
    TransformTooShort { kind: TransformKind, len: usize },
    NonFiniteInput,
    CacheClosed,
}

impl Display for DctError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ComplexInput => write!(f, "first argument must be a real sequence"),
            Self::LengthChangeUnsupported { requested, actual } => write!(
                f,
                "padding/truncating is not implemented: requested length {requested}, input has {actual}"
            ),
            Self::UnknownVariant { order } => write!(f, "transform type {order} not understood"),
            Self::UnknownNormalization { keyword } => {
                write!(f, "unknown normalize mode `{keyword}`")
            }
            Self::InvalidShape { detail } => write!(f, "invalid shape: {detail}"),
            Self::InvalidAxis { axis, rank } => {
                write!(f, "axis {axis} is out of range for rank {rank}")
            }
            Self::TransformTooShort { kind, len } => write!(
                f,
                "transform type {} requires at least 2 elements along the axis, got {len}",
                kind.order()
            ),
            Self::NonFiniteInput => write!(f, "non-finite input rejected by policy"),
            Self::CacheClosed => {
                write!(f, "kernel cache has been shut down; no further transforms")
            }
        }
    }
}

impl std::error::Error for DctError {}

/// Runtime-typed sequence for the dynamic dispatch surface.
///
/// Flat row-major data plus a shape. The element tag is what the dispatcher
/// inspects: the two real precisions select a kernel column, complex data is
/// rejected outright.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    Complex64(Vec<Complex64>),
}

impl SequenceData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::F32(values) => values.len(),
            Self::F64(values) => values.len(),
            Self::Complex64(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element precision, when the data is real-valued.
    #[must_use]
    pub fn precision(&self) -> Option<Precision> {
        match self {
            Self::F32(_) => Some(Precision::Single),
            Self::F64(_) => Some(Precision::Double),
            Self::Complex64(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    shape: Vec<usize>,
    data: SequenceData,
}

impl Sequence {
    /// Wrap flat data with an explicit shape; the shape product must match.
    pub fn with_shape(data: SequenceData, shape: Vec<usize>) -> Result<Self, DctError> {
        let expected = checked_product(&shape).ok_or(DctError::InvalidShape {
            detail: "shape product overflow",
        })?;
        if expected != data.len() {
            return Err(DctError::InvalidShape {
                detail: "shape product does not match data length",
            });
        }
        Ok(Self { shape, data })
    }

    #[must_use]
    pub fn from_f32(values: Vec<f32>) -> Self {
        let shape = vec![values.len()];
        Self {
            shape,
            data: SequenceData::F32(values),
        }
    }

    #[must_use]
    pub fn from_f64(values: Vec<f64>) -> Self {
        let shape = vec![values.len()];
        Self {
            shape,
            data: SequenceData::F64(values),
        }
    }

    #[must_use]
    pub fn from_complex64(values: Vec<Complex64>) -> Self {
        let shape = vec![values.len()];
        Self {
            shape,
            data: SequenceData::Complex64(values),
        }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn data(&self) -> &SequenceData {
        &self.data
    }
}

/// One record per dispatched transform, drained via [`take_transform_traces`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformTrace {
    pub operation_id: String,
    pub kind: TransformKind,
    pub n: usize,
    /// Number of 1-D rows the kernel ran over.
    pub lanes: usize,
    pub axis: usize,
    pub precision: Precision,
    pub normalization: Normalization,
    pub cache_hit: bool,
    pub mode: RuntimeMode,
    pub timing_ns: u128,
}

impl TransformTrace {
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

static TRACE_LOG: OnceLock<Mutex<Vec<TransformTrace>>> = OnceLock::new();
static OPERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn trace_log() -> &'static Mutex<Vec<TransformTrace>> {
    TRACE_LOG.get_or_init(|| Mutex::new(Vec::new()))
}

fn next_operation_id() -> String {
    let next = OPERATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("dct-op-{next:016x}")
}

fn record_trace(trace: TransformTrace) {
    if let Ok(mut log) = trace_log().lock() {
        log.push(trace);
    }
}

/// Drain the accumulated transform traces.
#[must_use]
pub fn take_transform_traces() -> Vec<TransformTrace> {
    if let Ok(mut log) = trace_log().lock() {
        let mut out = Vec::with_capacity(log.len());
        std::mem::swap(&mut *log, &mut out);
        return out;
    }
    Vec::new()
}

/// DCT type I over a 1-D sequence.
pub fn dct1<T: DctElement>(input: &[T], options: &DctOptions) -> Result<Vec<T>, DctError> {
    run_dct(TransformKind::Dct1, input, &[input.len()], -1, options)
}

/// DCT type II (commonly "the" DCT) over a 1-D sequence.
pub fn dct2<T: DctElement>(input: &[T], options: &DctOptions) -> Result<Vec<T>, DctError> {
    run_dct(TransformKind::Dct2, input, &[input.len()], -1, options)
}

/// DCT type III (the inverse-style transform) over a 1-D sequence.
pub fn dct3<T: DctElement>(input: &[T], options: &DctOptions) -> Result<Vec<T>, DctError> {
    run_dct(TransformKind::Dct3, input, &[input.len()], -1, options)
}

/// DCT type I along `axis` of a row-major n-D buffer.
pub fn dct1_along<T: DctElement>(
    input: &[T],
    shape: &[usize],
    axis: isize,
    options: &DctOptions,
) -> Result<Vec<T>, DctError> {
    run_dct(TransformKind::Dct1, input, shape, axis, options)
}

/// DCT type II along `axis` of a row-major n-D buffer.
pub fn dct2_along<T: DctElement>(
    input: &[T],
    shape: &[usize],
    axis: isize,
    options: &DctOptions,
) -> Result<Vec<T>, DctError> {
    run_dct(TransformKind::Dct2, input, shape, axis, options)
}

/// DCT type III along `axis` of a row-major n-D buffer.
pub fn dct3_along<T: DctElement>(
    input: &[T],
    shape: &[usize],
    axis: isize,
    options: &DctOptions,
) -> Result<Vec<T>, DctError> {
    run_dct(TransformKind::Dct3, input, shape, axis, options)
}

/// Runtime-typed dispatch: resolve variant order and normalization keyword
/// at call time, reject complex input, and forward on the precision tag.
///
/// All three wired variants are exposed here.
pub fn dct(
    input: &Sequence,
    order: u8,
    axis: isize,
    norm: Option<&str>,
    options: &DctOptions,
) -> Result<Sequence, DctError> {
    // realness is checked before anything else, as the reference dispatch does
    if matches!(input.data(), SequenceData::Complex64(_)) {
        return Err(DctError::ComplexInput);
    }
    let kind = TransformKind::from_order(order)?;
    let normalization = Normalization::from_keyword(norm)?;
    let options = options.clone().with_normalization(normalization);

    match input.data() {
        SequenceData::Complex64(_) => Err(DctError::ComplexInput),
        SequenceData::F32(values) => {
            let out = run_dct(kind, values, input.shape(), axis, &options)?;
            Sequence::with_shape(SequenceData::F32(out), input.shape().to_vec())
        }
        SequenceData::F64(values) => {
            let out = run_dct(kind, values, input.shape(), axis, &options)?;
            Sequence::with_shape(SequenceData::F64(out), input.shape().to_vec())
        }
    }
}

fn run_dct<T: DctElement>(
    kind: TransformKind,
    input: &[T],
    shape: &[usize],
    axis: isize,
    options: &DctOptions,
) -> Result<Vec<T>, DctError> {
    validate_shape(input.len(), shape)?;
    let axis_idx = resolve_axis(axis, shape.len())?;
    let n = shape[axis_idx];

    if let Some(requested) = options.length
        && requested != n
    {
        return Err(DctError::LengthChangeUnsupported {
            requested,
            actual: n,
        });
    }
    if kind == TransformKind::Dct1 && n < 2 {
        return Err(DctError::TransformTooShort { kind, len: n });
    }
    validate_finite(input, options)?;

    let kernel = T::kernel_for(kind);
    let key = CacheKey {
        kind,
        precision: T::PRECISION,
        n,
    };
    let (table, cache_hit) = shared_kernel_cache().get_or_build(key)?;

    let last = shape.len() - 1;
    let started = Instant::now();
    let output = if axis_idx == last {
        let mut data = input.to_vec();
        for row in data.chunks_exact_mut(n) {
            kernel.execute(row, &table, options.normalization);
        }
        data
    } else {
        let mut swapped = swap_axes(input, shape, axis_idx, last);
        for row in swapped.chunks_exact_mut(n) {
            kernel.execute(row, &table, options.normalization);
        }
        swap_axes(&swapped, &swapped_shape(shape, axis_idx, last), axis_idx, last)
    };

    record_trace(TransformTrace {
        operation_id: next_operation_id(),
        kind,
        n,
        lanes: input.len() / n,
        axis: axis_idx,
        precision: T::PRECISION,
        normalization: options.normalization,
        cache_hit,
        mode: options.mode,
        timing_ns: started.elapsed().as_nanos(),
    });

    Ok(output)
}

fn validate_shape(len: usize, shape: &[usize]) -> Result<(), DctError> {
    if shape.is_empty() {
        return Err(DctError::InvalidShape {
            detail: "shape cannot be empty",
        });
    }
    if shape.contains(&0) {
        return Err(DctError::InvalidShape {
            detail: "shape dimensions must be greater than zero",
        });
    }
    let expected = checked_product(shape).ok_or(DctError::InvalidShape {
        detail: "shape product overflow",
    })?;
    if expected != len {
        return Err(DctError::InvalidShape {
            detail: "shape product does not match data length",
        });
    }
    Ok(())
}

fn checked_product(shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &next| acc.checked_mul(next))
}

fn validate_finite<T: DctElement>(input: &[T], options: &DctOptions) -> Result<(), DctError> {
    let should_check = options.check_finite || options.mode == RuntimeMode::Hardened;
    if should_check && input.iter().any(|value| !value.is_finite_value()) {
        return Err(DctError::NonFiniteInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rxform_runtime::RuntimeMode;

    use super::{
        DctError, DctOptions, Sequence, SequenceData, dct, dct2, dct2_along, dct3,
        take_transform_traces,
    };
    use crate::{Normalization, Precision, TransformKind};

    #[test]
    fn options_default_to_strict_unnormalized() {
        let opts = DctOptions::default();
        assert_eq!(opts.mode, RuntimeMode::Strict);
        assert_eq!(opts.normalization, Normalization::Unnormalized);
        assert_eq!(opts.length, None);
        assert!(!opts.overwrite_input);
    }

    #[test]
    fn requested_length_must_match_axis_length() {
        let opts = DctOptions::default().with_length(Some(8));
        let err = dct2(&[1.0f64, 2.0, 3.0], &opts).expect_err("length change is unsupported");
        assert_eq!(
            err,
            DctError::LengthChangeUnsupported {
                requested: 8,
                actual: 3,
            }
        );
    }

    #[test]
    fn matching_requested_length_is_accepted() {
        let opts = DctOptions::default().with_length(Some(3));
        dct2(&[1.0f64, 2.0, 3.0], &opts).expect("length equal to input size is fine");
    }

    #[test]
    fn empty_input_is_an_invalid_shape() {
        let err = dct3::<f64>(&[], &DctOptions::default()).expect_err("empty input");
        assert!(matches!(err, DctError::InvalidShape { .. }));
    }

    #[test]
    fn shape_data_mismatch_is_rejected() {
        let err = dct2_along(&[1.0f64; 5], &[2, 3], -1, &DctOptions::default())
            .expect_err("shape/data mismatch");
        assert!(matches!(err, DctError::InvalidShape { .. }));
    }

    #[test]
    fn hardened_mode_rejects_non_finite_input() {
        let opts = DctOptions::default().with_mode(RuntimeMode::Hardened);
        let err = dct2(&[1.0, f64::NAN], &opts).expect_err("hardened mode rejects NaN");
        assert_eq!(err, DctError::NonFiniteInput);
        // Strict mode lets the same input through to the kernel
        dct2(&[1.0, f64::NAN], &DctOptions::default()).expect("strict mode does not finite-check");
    }

    #[test]
    fn complex_sequences_are_rejected_with_a_type_error() {
        let seq = Sequence::from_complex64(vec![(1.0, 0.5), (0.0, -2.0)]);
        for order in 1..=3u8 {
            let err = dct(&seq, order, -1, None, &DctOptions::default())
                .expect_err("complex input must fail");
            assert_eq!(err, DctError::ComplexInput);
        }
    }

    #[test]
    fn unknown_normalization_keyword_is_a_domain_error() {
        let seq = Sequence::from_f64(vec![1.0, 2.0, 3.0]);
        let err = dct(&seq, 2, -1, Some("foo"), &DctOptions::default())
            .expect_err("unknown keyword must fail");
        assert_eq!(
            err,
            DctError::UnknownNormalization {
                keyword: "foo".to_string(),
            }
        );
    }

    #[test]
    fn unknown_variant_order_is_a_domain_error() {
        let seq = Sequence::from_f64(vec![1.0, 2.0, 3.0]);
        let err =
            dct(&seq, 4, -1, None, &DctOptions::default()).expect_err("order 4 is not wired");
        assert_eq!(err, DctError::UnknownVariant { order: 4 });
    }

    #[test]
    fn dynamic_dispatch_preserves_precision_tag_and_shape() {
        let seq = Sequence::with_shape(SequenceData::F32(vec![1.0; 6]), vec![2, 3])
            .expect("consistent shape");
        let out = dct(&seq, 2, 0, Some("ortho"), &DctOptions::default())
            .expect("f32 transform along axis 0");
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out.data().precision(), Some(Precision::Single));
    }

    #[test]
    fn sequence_shape_must_match_data_length() {
        let err = Sequence::with_shape(SequenceData::F64(vec![1.0; 5]), vec![2, 3])
            .expect_err("5 elements cannot have shape (2,3)");
        assert!(matches!(err, DctError::InvalidShape { .. }));
    }

    #[test]
    fn repeated_lengths_surface_cache_hits_in_traces() {
        let _ = take_transform_traces();

        // length chosen to be unique across the test binary
        let input: Vec<f64> = (0..23).map(f64::from).collect();
        let opts = DctOptions::default();
        let _ = dct2(&input, &opts).expect("first transform");
        let _ = dct2(&input, &opts).expect("second transform");

        let mut traces: Vec<_> = take_transform_traces()
            .into_iter()
            .filter(|t| t.kind == TransformKind::Dct2 && t.n == 23)
            .collect();
        traces.sort_by(|lhs, rhs| lhs.operation_id.cmp(&rhs.operation_id));

        assert!(traces.len() >= 2);
        let last_two = &traces[traces.len() - 2..];
        assert!(!last_two[0].cache_hit);
        assert!(last_two[1].cache_hit);
        assert!(last_two[0].to_json_line().contains("\"operation_id\""));
    }
}
