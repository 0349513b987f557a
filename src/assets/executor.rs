use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Unit of out-of-band decode work.
pub type DecodeJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs decode jobs off the caller's turn.
///
/// Jobs report back through a channel that the owner drains on its own thread, so an executor
/// never needs to call back into engine state.
pub trait DecodeExecutor: Send + Sync {
    /// Schedule `job`. Must not block on the job's completion.
    fn spawn(&self, job: DecodeJob);
}

/// Executor backed by a dedicated rayon thread pool.
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
}

impl RayonExecutor {
    /// Build a pool with `threads` workers, or rayon's default when `None`.
    pub fn new(threads: Option<usize>) -> OverlayerResult<Self> {
        if let Some(n) = threads
            && n == 0
        {
            return Err(OverlayerError::validation(
                "decode 'threads' must be >= 1 when set",
            ));
        }
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("overlayer-decode-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            OverlayerError::validation(format!("failed to build decode thread pool: {e}"))
        })?;
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl DecodeExecutor for RayonExecutor {
    fn spawn(&self, job: DecodeJob) {
        self.pool.spawn(job);
    }
}

/// Executor that runs each job immediately on the calling thread.
///
/// Results still travel through the cache's completion channel, so they are applied on the next
/// pump rather than re-entrantly. Useful for batch rendering and deterministic tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl DecodeExecutor for InlineExecutor {
    fn spawn(&self, job: DecodeJob) {
        job();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/executor.rs"]
mod tests;
