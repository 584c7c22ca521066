//! Panic-site stack capture.
//!
//! By the time `catch_unwind` returns, the frames that panicked are gone.
//! Without a hook the recoverer can only capture its own (catch-site) stack.
//! [`install_panic_hook`] records the backtrace while the panicking frames
//! still exist and parks it in a thread-local; the recoverer picks it up on the
//! same worker thread.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

use lumen_core::domain::StackSnapshot;

static INSTALL: Once = Once::new();

thread_local! {
    static LAST_PANIC_STACK: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Install the process-wide capturing hook, chaining whatever hook was set before.
///
/// Opt-in and idempotent. Once installed, every panic in the process pays for a
/// backtrace capture, including panics unrelated to requests. Call it from the
/// host before the server starts, after any hook of its own.
pub fn install_panic_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            LAST_PANIC_STACK.with(|slot| {
                if let Ok(mut slot) = slot.try_borrow_mut() {
                    *slot = Some(trace);
                }
            });
            previous(info);
        }));
    });
}

/// Stack of the most recent panic on this thread, or the current stack if the
/// hook did not see one.
pub(crate) fn take_stack() -> StackSnapshot {
    let captured = LAST_PANIC_STACK.with(|slot| slot.try_borrow_mut().ok().and_then(|mut s| s.take()));
    StackSnapshot::new(captured.unwrap_or_else(|| Backtrace::force_capture().to_string()))
}
