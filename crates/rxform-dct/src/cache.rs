#![forbid(unsafe_code)]

//! Length-keyed cosine-table cache behind the kernel handles.
//!
//! Each (variant, precision, length) key owns one precomputed cosine table.
//! The cache has an explicit lifecycle: open on construction, lazily filled
//! on first use of a length, and closed exactly once by an explicit call.
//! Transforms attempted after close fail with [`DctError::CacheClosed`]
//! instead of resolving to released state.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex, OnceLock};

use crate::transforms::DctError;
use crate::{Precision, TransformKind};

/// Cache key for one kernel handle at one transform length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: TransformKind,
    pub precision: Precision,
    pub n: usize,
}

/// Precomputed cosine samples for one cache key.
///
/// Types II/III share the quarter-wave layout `cos(pi * m / (2N))` with
/// period `4N`; type I uses `cos(pi * m / (N-1))` with period `2(N-1)`.
/// Kernels index incrementally modulo the period.
#[derive(Debug, Clone, PartialEq)]
pub struct CosineTable {
    period: usize,
    values: Vec<f64>,
}

impl CosineTable {
    pub(crate) fn try_build(kind: TransformKind, n: usize) -> Result<Self, DctError> {
        if n == 0 {
            return Err(DctError::InvalidShape {
                detail: "transform length must be greater than zero",
            });
        }
        let (period, denominator) = match kind {
            TransformKind::Dct1 => {
                if n < 2 {
                    return Err(DctError::TransformTooShort { kind, len: n });
                }
                (2 * (n - 1), (n - 1) as f64)
            }
            TransformKind::Dct2 | TransformKind::Dct3 => (4 * n, 2.0 * n as f64),
        };
        let values = (0..period)
            .map(|m| (PI * m as f64 / denominator).cos())
            .collect();
        Ok(Self { period, values })
    }

    #[must_use]
    pub fn period(&self) -> usize {
        self.period
    }

    /// Cosine sample at reduced index `m`, `0 <= m < period`.
    #[must_use]
    pub fn at(&self, m: usize) -> f64 {
        self.values[m]
    }
}

#[derive(Debug)]
struct CacheInner {
    closed: bool,
    tables: HashMap<CacheKey, Arc<CosineTable>>,
}

/// Process-wide style kernel cache with an explicit open/close lifecycle.
///
/// Construction opens the cache; [`KernelCache::close`] releases every table
/// and is idempotent (only the first call reports having performed the
/// close). Lookups after close fail clearly.
#[derive(Debug)]
pub struct KernelCache {
    inner: Mutex<CacheInner>,
}

impl KernelCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                closed: false,
                tables: HashMap::new(),
            }),
        }
    }

    /// Fetch the table for `key`, building it on first use.
    ///
    /// The boolean reports whether the lookup was a cache hit.
    pub fn get_or_build(&self, key: CacheKey) -> Result<(Arc<CosineTable>, bool), DctError> {
        let Ok(mut inner) = self.inner.lock() else {
            return Err(DctError::CacheClosed);
        };
        if inner.closed {
            return Err(DctError::CacheClosed);
        }
        if let Some(table) = inner.tables.get(&key) {
            return Ok((Arc::clone(table), true));
        }
        let table = Arc::new(CosineTable::try_build(key.kind, key.n)?);
        inner.tables.insert(key, Arc::clone(&table));
        Ok((table, false))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.tables.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all cached tables without closing the cache.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.tables.clear();
        }
    }

    /// Release all tables and refuse further lookups.
    ///
    /// Returns `true` only for the call that performed the close.
    pub fn close(&self) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        if inner.closed {
            return false;
        }
        inner.closed = true;
        inner.tables.clear();
        true
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().map_or(true, |inner| inner.closed)
    }
}

impl Default for KernelCache {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED_KERNEL_CACHE: OnceLock<KernelCache> = OnceLock::new();

/// The cache backing the free-function transform entry points.
#[must_use]
pub fn shared_kernel_cache() -> &'static KernelCache {
    SHARED_KERNEL_CACHE.get_or_init(KernelCache::new)
}

/// Explicit process-level teardown; the single shutdown point.
///
/// Returns `true` only for the call that performed the close. Transforms
/// through the shared entry points fail with [`DctError::CacheClosed`]
/// afterwards.
pub fn close_shared_kernel_cache() -> bool {
    shared_kernel_cache().close()
}

#[must_use]
pub fn shared_kernel_cache_len() -> usize {
    shared_kernel_cache().len()
}

pub fn clear_shared_kernel_cache() {
    shared_kernel_cache().clear();
}
