//! Deterministic stand-ins for the terminal and the clock.
//!
//! A [`Journal`] is shared between a [`ManualClock`] and any number of
//! [`Tty`] devices and records every write, flush and sleep in the order they
//! happen. Time only moves when something sleeps or [`ManualClock::advance`]
//! is called, which makes pacing reproducible in tests and demos.
//!
//! ```
//! use dramatic::sim::{Journal, ManualClock, Tty};
//! use dramatic::{Pacing, Speed, TimedStream};
//! use std::rc::Rc;
//!
//! let journal = Journal::new();
//! let clock = Rc::new(ManualClock::new(&journal));
//! let pacing = Pacing::steady().with_clock(clock);
//! let mut stream = TimedStream::with_pacing(Tty::terminal("out", &journal), Speed::DEFAULT, &pacing);
//!
//! stream.write_str("hi").unwrap();
//! assert_eq!(journal.sleeps().len(), 2);
//! assert_eq!(journal.written("out"), b"hi");
//! ```

use crate::clock::{Clock, Interrupted};
use crate::device::Device;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Write(&'static str, Vec<u8>),
    Flush(&'static str),
    Sleep(Duration),
}

/// Shared, ordered log of device and clock activity.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: Entry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Each write call made to the named device.
    pub fn writes(&self, device: &str) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Write(name, bytes) if *name == device => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Everything written to the named device, concatenated.
    pub fn written(&self, device: &str) -> Vec<u8> {
        self.writes(device).concat()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Compact trace of writes and sleeps, flushes omitted: `"out"` for a
    /// write to the device named `out`, `"sleep"` for a sleep.
    pub fn trace(&self) -> Vec<&'static str> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Write(name, _) => Some(*name),
                Entry::Flush(_) => None,
                Entry::Sleep(_) => Some("sleep"),
            })
            .collect()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    journal: Journal,
    now: Cell<Duration>,
    sleeps: Cell<usize>,
    interrupt_on: Cell<Option<usize>>,
}

impl ManualClock {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            now: Cell::new(Duration::ZERO),
            sleeps: Cell::new(0),
            interrupt_on: Cell::new(None),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Interrupt the `n`th sleep from now (1-based). The interrupted sleep is
    /// still recorded and still moves time forward.
    pub fn interrupt_on(&self, n: usize) {
        self.sleeps.set(0);
        self.interrupt_on.set(Some(n));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        self.journal.record(Entry::Sleep(duration));
        self.advance(duration);
        let count = self.sleeps.get() + 1;
        self.sleeps.set(count);
        if self.interrupt_on.get() == Some(count) {
            self.interrupt_on.set(None);
            return Err(Interrupted);
        }
        Ok(())
    }
}

/// A named in-memory device that records into a [`Journal`].
pub struct Tty {
    name: &'static str,
    terminal: bool,
    journal: Journal,
}

impl Tty {
    /// A device that reports itself as a live terminal.
    pub fn terminal(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            terminal: true,
            journal: journal.clone(),
        }
    }

    /// A device that behaves like a file or pipe.
    pub fn redirected(name: &'static str, journal: &Journal) -> Self {
        Self {
            terminal: false,
            ..Self::terminal(name, journal)
        }
    }
}

impl fmt::Debug for Tty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tty({})", self.name)
    }
}

impl Write for Tty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.journal.record(Entry::Write(self.name, buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.journal.record(Entry::Flush(self.name));
        Ok(())
    }
}

impl Device for Tty {
    fn is_terminal(&self) -> bool {
        self.terminal
    }
}
