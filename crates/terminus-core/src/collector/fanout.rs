//! Fan-out of independently failing tasks onto scoped OS threads.
//!
//! The enclosing `thread::scope` is the join barrier: it returns only after
//! every task spawned into it has finished, successfully or not.

use std::fmt::Display;
use std::thread::{self, Scope};

use tracing::warn;

/// Runs `job` on its own thread inside `scope`.
///
/// An error returned by the job, or a failure to start the thread, is logged
/// and goes no further.
pub(crate) fn spawn_isolated<'scope, 'env, E, J>(
    scope: &'scope Scope<'scope, 'env>,
    kind: &'static str,
    task: String,
    job: J,
) where
    J: FnOnce() -> Result<(), E> + Send + 'scope,
    E: Display,
{
    let thread_task = task.clone();
    let spawned = thread::Builder::new()
        .name(format!("{}:{}", kind, task))
        .spawn_scoped(scope, move || {
            if let Err(e) = job() {
                warn!(kind, task = %thread_task, error = %e, "task failed");
            }
        });

    if let Err(e) = spawned {
        warn!(kind, task = %task, error = %e, "failed to start task");
    }
}
