//! Shared rayon pool for the data-parallel stages.
//!
//! Covariance row fill and chi-square trials both run on this pool so that
//! nested use from many caller threads does not oversubscribe the machine.

#[cfg(feature = "parallel")]
use rayon::ThreadPool;

#[cfg(feature = "parallel")]
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
static THREAD_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// The shared pool, or `None` if it could not be built (rayon's global pool is
/// used instead).
///
/// Worker threads get an 8 MB stack; the Legendre recurrences are shallow but
/// large `Vec` rows are built per task.
#[cfg(feature = "parallel")]
fn thread_pool() -> Option<&'static ThreadPool> {
    THREAD_POOL
        .get_or_init(|| {
            rayon::ThreadPoolBuilder::new()
                .stack_size(8 * 1024 * 1024)
                .thread_name(|i| format!("sky-covariance-{i}"))
                .build()
                .map_err(|e| tracing::warn!("falling back to global rayon pool: {e}"))
                .ok()
        })
        .as_ref()
}

/// Run `op` inside the shared pool.
#[cfg(feature = "parallel")]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Run `op` directly (no `parallel` feature).
#[cfg(not(feature = "parallel"))]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R,
{
    op()
}
