#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};

/// What became of a graded call run under a deadline.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The call returned within the budget.
    Finished(T),
    /// The budget elapsed first; the worker thread was abandoned and may
    /// still be running, but its result will never be observed.
    TimedOut,
    /// The worker panicked before producing a result.
    Crashed,
}

/// Runs `job` on a dedicated worker thread and waits at most `limit` for its
/// result.
///
/// A hung call cannot be interrupted, but abandoning the detached worker
/// means the grading run itself always makes progress. The worker is joined
/// only on the happy path.
pub fn run_with_deadline<T, F>(limit: Duration, job: F) -> Result<Outcome<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("graded-question".to_string())
        .spawn(move || {
            let _ = tx.send(job());
        })
        .context("failed to spawn grading worker")?;

    match rx.recv_timeout(limit) {
        Ok(value) => {
            let _ = handle.join();
            Ok(Outcome::Finished(value))
        }
        Err(RecvTimeoutError::Timeout) => Ok(Outcome::TimedOut),
        Err(RecvTimeoutError::Disconnected) => Ok(Outcome::Crashed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_jobs_finish() {
        let outcome = run_with_deadline(Duration::from_secs(1), || 41 + 1).expect("run");
        assert!(matches!(outcome, Outcome::Finished(42)));
    }

    #[test]
    fn slow_jobs_time_out() {
        let outcome = run_with_deadline(Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            0
        })
        .expect("run");
        assert!(matches!(outcome, Outcome::TimedOut));
    }

    #[test]
    fn panicking_jobs_are_reported_as_crashed() {
        let outcome: Outcome<i32> =
            run_with_deadline(Duration::from_secs(1), || panic!("boom")).expect("run");
        assert!(matches!(outcome, Outcome::Crashed));
    }
}
