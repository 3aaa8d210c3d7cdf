//! The output context: standard output and standard error as values that can
//! be switched between plain and timed.
//!
//! ```
//! use dramatic::{Drama, Outputs};
//! use std::io::Write;
//!
//! let mut outputs = Outputs::stdio();
//! Drama::new().run(&mut outputs, |out| {
//!     writeln!(out.stdout(), "typed out, if stdout is a terminal")
//! })?;
//! # Ok::<(), std::io::Error>(())
//! ```

use crate::device::Device;
use crate::error::Result;
use crate::speed::Speed;
use crate::stream::{Pacing, TimedStream};
use std::io::{self, Write};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// One output channel, either written to directly or through a [`TimedStream`].
#[derive(Debug)]
pub enum Stream {
    Plain(Box<dyn Device>),
    Timed(TimedStream<Box<dyn Device>>),
}

impl Stream {
    pub fn plain(device: impl Device + 'static) -> Self {
        Self::Plain(Box::new(device))
    }

    pub const fn is_timed(&self) -> bool {
        matches!(self, Self::Timed(_))
    }

    /// Write `text` in one call, typed out if this stream is timed.
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        match self {
            Self::Plain(device) => device.write_all(text.as_bytes()),
            Self::Timed(stream) => stream.write_str(text),
        }
    }

    fn device(&self) -> &dyn Device {
        match self {
            Self::Plain(device) => &**device,
            Self::Timed(stream) => &**stream.get_ref(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.device().is_terminal()
    }

    fn wrapped(self, speed: Speed, pacing: &Pacing) -> Self {
        match self {
            Self::Plain(device) => Self::Timed(TimedStream::with_pacing(device, speed, pacing)),
            timed @ Self::Timed(_) => timed,
        }
    }

    fn unwrapped(self) -> Self {
        match self {
            Self::Timed(stream) => Self::Plain(stream.into_inner()),
            plain @ Self::Plain(_) => plain,
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(device) => device.write(buf),
            Self::Timed(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(device) => device.flush(),
            Self::Timed(stream) => stream.flush(),
        }
    }
}

/// Which standard stream an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stdout,
    Stderr,
}

/// Standard output and standard error for a program, plus the [`Pacing`]
/// used whenever one of them is switched to timed output.
#[derive(Debug)]
pub struct Outputs {
    stdout: Stream,
    stderr: Stream,
    pacing: Pacing,
}

impl Outputs {
    pub fn new(stdout: impl Device + 'static, stderr: impl Device + 'static) -> Self {
        Self {
            stdout: Stream::plain(stdout),
            stderr: Stream::plain(stderr),
            pacing: Pacing::natural(),
        }
    }

    /// The process's real standard output and standard error.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn stdout(&mut self) -> &mut Stream {
        &mut self.stdout
    }

    pub fn stderr(&mut self) -> &mut Stream {
        &mut self.stderr
    }

    pub fn get(&mut self, target: Target) -> &mut Stream {
        match target {
            Target::Stdout => &mut self.stdout,
            Target::Stderr => &mut self.stderr,
        }
    }

    /// Switch `target` to timed output. Returns `false`, and changes nothing,
    /// if it already is timed.
    pub fn enable(&mut self, target: Target, speed: Speed) -> bool {
        let pacing = self.pacing.clone();
        let slot = self.get(target);
        if slot.is_timed() {
            return false;
        }
        let plain = std::mem::replace(slot, Stream::plain(io::sink()));
        *slot = plain.wrapped(speed, &pacing);
        debug!(?target, %speed, "timed output enabled");
        true
    }

    /// Put the original device of `target` back. Returns `false` if it was
    /// not timed.
    pub fn disable(&mut self, target: Target) -> bool {
        let slot = self.get(target);
        if !slot.is_timed() {
            return false;
        }
        let timed = std::mem::replace(slot, Stream::plain(io::sink()));
        *slot = timed.unwrapped();
        debug!(?target, "timed output disabled");
        true
    }
}

/// Settings for switching standard output and/or standard error to timed
/// output, either for a scope ([`Drama::enter`]) or around a function call
/// ([`Drama::run`]).
///
/// Activating it again while already active is harmless: streams that are
/// already timed are left as they are, and only the activation that did the
/// wrapping undoes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drama {
    speed: Speed,
    stdout: bool,
    stderr: bool,
}

impl Drama {
    /// Both streams at [`Speed::DEFAULT`].
    pub const fn new() -> Self {
        Self {
            speed: Speed::DEFAULT,
            stdout: true,
            stderr: true,
        }
    }

    /// Like [`Drama::new`], at `chars_per_second`.
    ///
    /// # Errors
    ///
    /// Fails for a speed that is not positive and finite.
    pub fn at_speed(chars_per_second: f64) -> Result<Self> {
        Ok(Self::new().with_speed(Speed::new(chars_per_second)?))
    }

    pub const fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub const fn stdout(mut self, enabled: bool) -> Self {
        self.stdout = enabled;
        self
    }

    pub const fn stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    pub const fn speed(&self) -> Speed {
        self.speed
    }

    /// Switch the selected streams to timed output until the returned
    /// [`Scene`] is dropped.
    pub fn enter(self, outputs: &mut Outputs) -> Scene<'_> {
        let (stdout, stderr) = self.apply(outputs);
        Scene {
            outputs,
            stdout,
            stderr,
        }
    }

    /// Run `f` with the selected streams timed, restoring them afterwards even
    /// if `f` returns early or panics.
    pub fn run<T>(self, outputs: &mut Outputs, f: impl FnOnce(&mut Outputs) -> T) -> T {
        let mut scene = self.enter(outputs);
        f(&mut *scene)
    }

    /// Enable the selected streams, reporting which ones this call wrapped.
    pub(crate) fn apply(self, outputs: &mut Outputs) -> (bool, bool) {
        let stdout = self.stdout && outputs.enable(Target::Stdout, self.speed);
        let stderr = self.stderr && outputs.enable(Target::Stderr, self.speed);
        (stdout, stderr)
    }
}

impl Default for Drama {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard returned by [`Drama::enter`]; restores the streams it wrapped when
/// dropped.
#[derive(Debug)]
pub struct Scene<'a> {
    outputs: &'a mut Outputs,
    stdout: bool,
    stderr: bool,
}

impl Deref for Scene<'_> {
    type Target = Outputs;

    fn deref(&self) -> &Outputs {
        self.outputs
    }
}

impl DerefMut for Scene<'_> {
    fn deref_mut(&mut self) -> &mut Outputs {
        self.outputs
    }
}

impl Drop for Scene<'_> {
    fn drop(&mut self) {
        if self.stderr {
            self.outputs.disable(Target::Stderr);
        }
        if self.stdout {
            self.outputs.disable(Target::Stdout);
        }
    }
}
