//! Monotonic time and interruptible sleeping.
//!
//! [`SystemClock`] sleeps in short slices and watches a flag raised by a
//! SIGINT handler, so Ctrl-C during a typing delay cuts the delay short
//! instead of killing the process. The handler is installed by the first
//! sleep and only raises that flag; handlers the host program registers
//! itself keep running. A program that wants Ctrl-C outside a delay to end it
//! calls [`exit_on_interrupt`].

use signal_hook::consts::SIGINT;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

const SLICE: Duration = Duration::from_millis(5);

/// A sleep was cut short by an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sleep interrupted")]
pub struct Interrupted;

/// Time source used to pace output.
///
/// `now` is a monotonic offset from an arbitrary origin fixed per clock.
pub trait Clock {
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if the wait was cancelled before it elapsed.
    fn sleep(&self, duration: Duration) -> Result<(), Interrupted>;
}

struct Interrupts {
    /// Set by the handler; consumed by the sleeping thread.
    pending: Arc<AtomicBool>,
    /// True whenever no sleep is in progress.
    idle: Arc<AtomicBool>,
    watching: OnceLock<bool>,
}

impl Interrupts {
    fn get() -> &'static Self {
        static INTERRUPTS: OnceLock<Interrupts> = OnceLock::new();
        INTERRUPTS.get_or_init(|| Self {
            pending: Arc::new(AtomicBool::new(false)),
            idle: Arc::new(AtomicBool::new(true)),
            watching: OnceLock::new(),
        })
    }

    /// Install the SIGINT flag handler once. Returns whether it is in place.
    fn watch(&self) -> bool {
        *self.watching.get_or_init(|| {
            match signal_hook::flag::register(SIGINT, Arc::clone(&self.pending)) {
                Ok(_) => {
                    debug!("watching for interrupts");
                    true
                }
                Err(err) => {
                    warn!("cannot watch for interrupts, delays will not be skippable: {err}");
                    false
                }
            }
        })
    }
}

/// Make SIGINT end the process with `status`, except while a [`SystemClock`]
/// sleep is in progress, where it only cuts that sleep short.
///
/// Meant for programs that have no SIGINT handling of their own. Once any
/// SIGINT handler is registered the default action is gone, so without this
/// Ctrl-C outside a delay does nothing.
///
/// # Errors
///
/// Fails if the handler cannot be registered.
pub fn exit_on_interrupt(status: i32) -> io::Result<()> {
    let interrupts = Interrupts::get();
    interrupts.watch();
    signal_hook::flag::register_conditional_shutdown(SIGINT, status, Arc::clone(&interrupts.idle))?;
    Ok(())
}

/// Wall-clock time with Ctrl-C aware sleeps.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SystemClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClock")
            .field("origin", &self.origin)
            .finish()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let flags = Interrupts::get();
        if !flags.watch() {
            thread::sleep(duration);
            return Ok(());
        }

        let deadline = Instant::now() + duration;
        flags.pending.store(false, Ordering::SeqCst);
        flags.idle.store(false, Ordering::SeqCst);
        let outcome = loop {
            if flags.pending.swap(false, Ordering::SeqCst) {
                break Err(Interrupted);
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break Ok(());
            }
            thread::sleep(left.min(SLICE));
        };
        flags.idle.store(true, Ordering::SeqCst);
        outcome
    }
}
