//! # Dramatic
//!
//! Print terminal output character by character, as if someone were typing it.
//!
//! Output written through a [`TimedStream`] appears one keystroke at a time,
//! with delays that follow how people actually type: a little slower away from
//! the home row and on shifted keys, a pause at the end of a line, careful
//! over long numbers, and a breath after punctuation. Pressing Ctrl-C during
//! a delay skips ahead instead of aborting.
//!
//! Pacing is a terminal-only effect. When output is redirected to a file or a
//! pipe it is written straight through.
//!
//! ## Quick start
//!
//! ```no_run
//! use dramatic::Line;
//!
//! dramatic::print(&Line::of(["This", "prints", "character-by-character"]))?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Scoped output
//!
//! An [`Outputs`] holds standard output and standard error. A [`Drama`]
//! switches them to timed output for a scope, or around a call, and puts the
//! original devices back afterwards:
//!
//! ```no_run
//! use dramatic::{Drama, Outputs};
//! use std::io::Write;
//!
//! let mut outputs = Outputs::stdio();
//! {
//!     let mut scene = Drama::at_speed(30.0)?.enter(&mut outputs);
//!     writeln!(scene.stdout(), "ALL output will display dramatically.")?;
//!     writeln!(scene.stderr(), "Standard error too.")?;
//! }
//! writeln!(outputs.stdout(), "Back to normal.")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## For the rest of the program
//!
//! [`start`] and [`stop`] do the same for a shared console reached through
//! [`stdout`] and [`stderr`]; see [`global`].
//!
//! ## Timing
//!
//! Each character takes `multiplier / speed` seconds, where the multiplier
//! comes from a [`DelayModel`]. [`Typist`] is the default; [`Steady`] keeps an
//! even pace. Clock and model are swappable through [`Pacing`], and [`sim`]
//! has a manual clock and recording devices for reproducible runs.

pub mod clock;
pub mod delay;
pub mod device;
pub mod error;
pub mod global;
pub mod line;
pub mod output;
pub mod sim;
pub mod speed;
pub mod stream;

pub use clock::{Clock, Interrupted, SystemClock, exit_on_interrupt};
pub use delay::{DelayModel, Keystroke, NoVariation, RandomVariation, Steady, Typist, Variation};
pub use device::Device;
pub use error::{Error, Result};
pub use global::{eprint, install, print, start, stderr, stdout, stop};
pub use line::Line;
pub use output::{Drama, Outputs, Scene, Stream, Target};
pub use speed::Speed;
pub use stream::{COOLDOWN, Pacing, TimedStream};
