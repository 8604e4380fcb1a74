#![forbid(unsafe_code)]

//! Axis plumbing for the swap-compute-swap dispatch contract.
//!
//! Kernels only ever operate on the innermost axis. When a caller names any
//! other axis, the dispatcher swaps it with the last axis, runs the kernel,
//! and swaps back; this module supplies the resolution and transpose pieces.

use crate::transforms::DctError;

/// Resolve a caller-facing axis index, counting negatives from the end
/// (`-1` is the last axis).
pub fn resolve_axis(axis: isize, rank: usize) -> Result<usize, DctError> {
    let rank_i = rank as isize;
    let resolved = if axis < 0 { axis + rank_i } else { axis };
    if resolved < 0 || resolved >= rank_i {
        return Err(DctError::InvalidAxis { axis, rank });
    }
    Ok(resolved as usize)
}

/// Shape of the array after swapping axes `a` and `b`.
#[must_use]
pub fn swapped_shape(shape: &[usize], a: usize, b: usize) -> Vec<usize> {
    let mut out = shape.to_vec();
    out.swap(a, b);
    out
}

/// Value-preserving axis swap over a row-major flat buffer.
///
/// Returns the data laid out row-major for [`swapped_shape`]. Applying the
/// swap twice restores the original buffer.
#[must_use]
pub fn swap_axes<T: Copy>(data: &[T], shape: &[usize], a: usize, b: usize) -> Vec<T> {
    if a == b {
        return data.to_vec();
    }

    let rank = shape.len();
    let out_shape = swapped_shape(shape, a, b);
    let in_strides = row_major_strides(shape);

    let mut out = Vec::with_capacity(data.len());
    let mut index = vec![0usize; rank];
    for _ in 0..data.len() {
        let mut offset = 0;
        for (dim, &coord) in index.iter().enumerate() {
            let src_dim = if dim == a {
                b
            } else if dim == b {
                a
            } else {
                dim
            };
            offset += coord * in_strides[src_dim];
        }
        out.push(data[offset]);

        // odometer increment over the output shape
        for dim in (0..rank).rev() {
            index[dim] += 1;
            if index[dim] < out_shape[dim] {
                break;
            }
            index[dim] = 0;
        }
    }
    out
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for dim in (0..shape.len().saturating_sub(1)).rev() {
        strides[dim] = strides[dim + 1] * shape[dim + 1];
    }
    strides
}
