#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide gate for student-visible output.
static MUTED: AtomicBool = AtomicBool::new(false);

/// Whether student output is currently muted.
pub fn is_muted() -> bool {
    MUTED.load(Ordering::SeqCst)
}

/// Prints a line of student output unless muting is active.
///
/// All output produced by student code funnels through here (the evaluation
/// engine's `print` is wired to it); the harness's own messages print
/// directly and are never muted.
pub fn print_line(text: &str) {
    if !is_muted() {
        println!("{text}");
    }
}

/// Scoped acquisition of the output gate.
///
/// Muting nests to a single level only: acquiring while already muted yields
/// an empty guard, and dropping an empty guard restores nothing. This is not
/// a counting semaphore, so improperly paired acquisitions from nested
/// contexts will under- or over-restore output.
#[must_use = "dropping the guard immediately unmutes"]
pub struct MuteGuard {
    /// True only for the guard that actually flipped the gate.
    owned: bool,
}

impl MuteGuard {
    /// Mutes student output until the returned guard is dropped. A no-op if
    /// output is already muted.
    pub fn acquire() -> Self {
        let owned = MUTED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        MuteGuard { owned }
    }
}

impl Drop for MuteGuard {
    fn drop(&mut self) {
        if self.owned {
            MUTED.store(false, Ordering::SeqCst);
        }
    }
}
