use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{FractalError, FractalResult};

pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 50_000_000;
pub const DEFAULT_MAX_ITERATIONS: u64 = 50_000_000;
pub const DEFAULT_MAX_PASSES: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest expanded instruction string accepted, in symbols.
    pub max_instructions: u64,
    /// Largest IFS iteration count accepted.
    pub max_iterations: u64,
    /// Most grammar rewriting passes accepted.
    pub max_passes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl Limits {
    pub(crate) fn check_instructions(&self, requested: u64) -> FractalResult<()> {
        // no String grows past isize::MAX bytes
        let limit = self.max_instructions.min(isize::MAX as u64);
        check("instruction length", limit, requested)
    }

    pub(crate) fn check_iterations(&self, requested: u64) -> FractalResult<()> {
        check("iteration count", self.max_iterations, requested)
    }

    pub(crate) fn check_passes(&self, requested: u64) -> FractalResult<()> {
        check("rewriting passes", self.max_passes, requested)
    }
}

fn check(resource: &'static str, limit: u64, requested: u64) -> FractalResult<()> {
    if requested > limit {
        return Err(FractalError::ResourceExceeded {
            resource,
            limit,
            requested,
        });
    }
    Ok(())
}

/// Shared flag a host flips to stop a chunked run at its next chunk boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending { done: usize, total: usize },
    Done,
}

impl Progress {
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }

    pub(crate) fn from_counts(done: usize, total: usize) -> Self {
        if done >= total {
            Self::Done
        } else {
            Self::Pending { done, total }
        }
    }
}

pub(crate) fn check_cancel(cancel: Option<&CancelToken>, completed: usize) -> FractalResult<()> {
    if cancel.is_some_and(CancelToken::is_cancelled) {
        tracing::warn!(completed, "generation cancelled");
        return Err(FractalError::Cancelled { completed });
    }
    Ok(())
}
