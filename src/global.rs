//! Convenience API over a shared console.
//!
//! The console is an [`Outputs`] for the real standard streams, created on
//! first use. It lives per thread; for the usual single-threaded command line
//! program that is the process's one console. Code that can pass an
//! [`Outputs`] around should do that instead.
//!
//! ```no_run
//! use std::io::Write;
//!
//! dramatic::start(dramatic::Drama::new())?;
//! writeln!(dramatic::stdout(), "Everything from here on is typed out.")?;
//! dramatic::stop()?;
//! # Ok::<(), std::io::Error>(())
//! ```

use crate::line::Line;
use crate::output::{Drama, Outputs, Target};
use std::cell::RefCell;
use std::io::{self, Write};

thread_local! {
    static CONSOLE: RefCell<Option<Outputs>> = const { RefCell::new(None) };
}

fn with_console<T>(f: impl FnOnce(&mut Outputs) -> T) -> io::Result<T> {
    CONSOLE.with(|cell| {
        let mut console = cell
            .try_borrow_mut()
            .map_err(|_| io::Error::other("the console is already being written to"))?;
        Ok(f(console.get_or_insert_with(Outputs::stdio)))
    })
}

/// Replace the console, returning the previous one if it had been created.
pub fn install(outputs: Outputs) -> io::Result<Option<Outputs>> {
    CONSOLE.with(|cell| {
        let mut console = cell
            .try_borrow_mut()
            .map_err(|_| io::Error::other("the console is already being written to"))?;
        Ok(console.replace(outputs))
    })
}

/// Switch the console streams selected by `drama` to timed output until
/// [`stop`] is called. Streams that already are timed are left alone.
pub fn start(drama: Drama) -> io::Result<()> {
    with_console(|outputs| {
        drama.apply(outputs);
    })
}

/// Restore whichever console streams are timed.
pub fn stop() -> io::Result<()> {
    with_console(|outputs| {
        outputs.disable(Target::Stdout);
        outputs.disable(Target::Stderr);
    })
}

/// Writer for the console's standard output.
pub fn stdout() -> Console {
    Console(Target::Stdout)
}

/// Writer for the console's standard error.
pub fn stderr() -> Console {
    Console(Target::Stderr)
}

/// Handle to one of the console streams; see [`stdout`] and [`stderr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Console(Target);

impl Console {
    pub fn is_timed(&self) -> io::Result<bool> {
        with_console(|outputs| outputs.get(self.0).is_timed())
    }
}

impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        with_console(|outputs| outputs.get(self.0).write(buf))?
    }

    fn flush(&mut self) -> io::Result<()> {
        with_console(|outputs| outputs.get(self.0).flush())?
    }
}

/// Type `line` out on the console's standard output, even if it has not been
/// switched to timed output.
pub fn print(line: &Line) -> io::Result<()> {
    emit(Target::Stdout, line)
}

/// [`print`] for standard error.
pub fn eprint(line: &Line) -> io::Result<()> {
    emit(Target::Stderr, line)
}

fn emit(target: Target, line: &Line) -> io::Result<()> {
    let drama = Drama::new()
        .stdout(target == Target::Stdout)
        .stderr(target == Target::Stderr);
    with_console(|outputs| {
        let mut scene = drama.enter(outputs);
        let stream = scene.get(target);
        stream.write_str(&line.to_string())?;
        stream.flush()
    })?
}
