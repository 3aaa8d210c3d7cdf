//! [`TimedStream`], a writer that types its input out one character at a time.

use crate::clock::{Clock, SystemClock};
use crate::delay::{DelayModel, IndentRun, Keystroke, Steady, Typist};
use crate::device::Device;
use crate::speed::Speed;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace};

/// How long output runs at full speed after a delay is interrupted.
pub const COOLDOWN: Duration = Duration::from_millis(500);

type ModelFactory = Rc<dyn Fn() -> Box<dyn DelayModel>>;

/// The clock and delay model a [`TimedStream`] is built with.
///
/// Cheap to clone; every stream built from the same `Pacing` shares its clock
/// and gets a fresh delay model.
#[derive(Clone)]
pub struct Pacing {
    clock: Rc<dyn Clock>,
    model: ModelFactory,
}

impl Pacing {
    /// System clock, typed like a person.
    pub fn natural() -> Self {
        Self {
            clock: Rc::new(SystemClock::new()),
            model: Rc::new(|| -> Box<dyn DelayModel> { Box::new(Typist::new()) }),
        }
    }

    /// System clock, one base interval per character.
    pub fn steady() -> Self {
        Self::natural().with_model(|| Box::new(Steady::default()))
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_model<F>(mut self, model: F) -> Self
    where
        F: Fn() -> Box<dyn DelayModel> + 'static,
    {
        self.model = Rc::new(model);
        self
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::natural()
    }
}

impl fmt::Debug for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pacing").finish_non_exhaustive()
    }
}

/// Writes text to a [`Device`] one character at a time, pausing between
/// characters the way a person typing would.
///
/// Pacing only applies when the device is a terminal. Redirected output is
/// passed through in a single write with no delay.
///
/// Interrupting a delay (Ctrl-C with [`SystemClock`]) does not fail the write:
/// the rest of the text, and anything written within [`COOLDOWN`] of the
/// interrupt, goes out at full speed.
///
/// Neighbouring characters are only looked up within a single write call.
pub struct TimedStream<D: Device> {
    device: D,
    speed: Speed,
    model: Box<dyn DelayModel>,
    clock: Rc<dyn Clock>,
    suspended_until: Duration,
    /// Bytes of a UTF-8 sequence split across `write` calls.
    partial: Vec<u8>,
}

impl<D: Device> TimedStream<D> {
    /// Wrap `device` with [`Pacing::natural`].
    pub fn new(device: D, speed: Speed) -> Self {
        Self::with_pacing(device, speed, &Pacing::natural())
    }

    pub fn with_pacing(device: D, speed: Speed, pacing: &Pacing) -> Self {
        let clock = Rc::clone(&pacing.clock);
        Self {
            suspended_until: clock.now(),
            device,
            speed,
            model: (pacing.model)(),
            clock,
            partial: Vec::new(),
        }
    }

    pub const fn speed(&self) -> Speed {
        self.speed
    }

    pub fn get_ref(&self) -> &D {
        &self.device
    }

    pub fn get_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Release the device without closing it.
    ///
    /// Bytes of an unfinished UTF-8 sequence are handed over as they are.
    /// Failing to write them (say, because the device is already closed) is
    /// ignored.
    pub fn into_inner(mut self) -> D {
        let pending = self.partial.len();
        if let Err(err) = self.release_partial() {
            debug!("dropping {pending} pending bytes on detach: {err}");
        }
        self.device
    }

    /// Write `text`, typed out if the device is a terminal.
    ///
    /// Bytes of an unfinished UTF-8 sequence left by an earlier
    /// [`Write::write`] can no longer be completed and go out first, as they
    /// are.
    ///
    /// # Errors
    ///
    /// Device write and flush failures are returned unchanged. Characters
    /// before the failing one have already been written.
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.release_partial()?;
        self.type_out(text)
    }

    fn release_partial(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            self.device.write_all(&self.partial)?;
            self.partial.clear();
        }
        Ok(())
    }

    fn type_out(&mut self, text: &str) -> io::Result<()> {
        if !self.device.is_terminal() {
            return self.device.write_all(text.as_bytes());
        }

        let chars: Vec<char> = text.chars().collect();
        let mut indent = IndentRun::new();
        let mut buf = [0u8; 4];
        for (i, &current) in chars.iter().enumerate() {
            let keystroke = Keystroke {
                prev: i.checked_sub(1).map(|j| chars[j]),
                current,
                next: chars.get(i + 1).copied(),
                indent: indent.advance(current),
            };

            let started = self.clock.now();
            self.device
                .write_all(current.encode_utf8(&mut buf).as_bytes())?;
            self.device.flush()?;

            if started >= self.suspended_until {
                self.pause(&keystroke, started);
            }
        }
        Ok(())
    }

    fn pause(&mut self, keystroke: &Keystroke, started: Duration) {
        let multiplier = self.model.multiplier(keystroke);
        let target = Duration::try_from_secs_f64(multiplier / self.speed.get())
            .unwrap_or(Duration::ZERO);
        let elapsed = self.clock.now().saturating_sub(started);
        let remaining = target.saturating_sub(elapsed);
        if remaining.is_zero() {
            return;
        }
        if self.clock.sleep(remaining).is_err() {
            self.suspended_until = self.clock.now() + COOLDOWN;
            trace!(until = ?self.suspended_until, "delay interrupted, skipping ahead");
        }
    }
}

/// On a terminal a failed `write` may already have typed out some of `buf`.
/// The unfinished UTF-8 sequence held from earlier calls is kept either way.
impl<D: Device> Write for TimedStream<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.partial.is_empty() && !self.device.is_terminal() {
            return self.device.write(buf);
        }

        let carried = self.partial.len();
        let mut bytes = std::mem::take(&mut self.partial);
        bytes.extend_from_slice(buf);
        let complete = bytes.len() - incomplete_tail(&bytes);
        let typed = self.type_out(&String::from_utf8_lossy(&bytes[..complete]));
        match typed {
            Ok(()) => {
                bytes.drain(..complete);
                self.partial = bytes;
                Ok(buf.len())
            }
            Err(err) => {
                bytes.truncate(carried);
                self.partial = bytes;
                Err(err)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.device.flush()
    }
}

impl<D: Device> fmt::Debug for TimedStream<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimedStream({:?})", self.device)
    }
}

/// Length of a UTF-8 sequence cut off at the end of `bytes`.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::{NoVariation, Typist};
    use crate::sim::{Entry, Journal, ManualClock, Tty};

    fn steady(journal: &Journal) -> (Rc<ManualClock>, Pacing) {
        let clock = Rc::new(ManualClock::new(journal));
        let pacing = Pacing::steady().with_clock(clock.clone());
        (clock, pacing)
    }

    fn terminal(journal: &Journal, speed: f64) -> (Rc<ManualClock>, TimedStream<Tty>) {
        let (clock, pacing) = steady(journal);
        let stream = TimedStream::with_pacing(
            Tty::terminal("out", journal),
            Speed::new(speed).unwrap(),
            &pacing,
        );
        (clock, stream)
    }

    fn per_char(text: &str) -> Vec<Vec<u8>> {
        text.chars().map(|c| c.to_string().into_bytes()).collect()
    }

    #[test]
    fn test_default_speed() {
        let journal = Journal::new();
        let (_, mut stream) = terminal(&journal, 75.0);
        stream.write_str("Dramatic?\n").unwrap();
        assert_eq!(journal.sleeps(), vec![Duration::from_secs_f64(1.0 / 75.0); 10]);
    }

    #[test]
    fn test_custom_speed() {
        let journal = Journal::new();
        let (_, mut stream) = terminal(&journal, 30.0);
        stream.write_str("Dramatic?\n").unwrap();
        assert_eq!(journal.sleeps(), vec![Duration::from_secs_f64(1.0 / 30.0); 10]);
    }

    #[test]
    fn test_writes_flushes_and_sleeps_per_character() {
        let journal = Journal::new();
        let (_, mut stream) = terminal(&journal, 75.0);
        stream.write_str("Hi!").unwrap();

        let sleep = Duration::from_secs_f64(1.0 / 75.0);
        let mut expected = Vec::new();
        for c in ["H", "i", "!"] {
            expected.push(Entry::Write("out", c.as_bytes().to_vec()));
            expected.push(Entry::Flush("out"));
            expected.push(Entry::Sleep(sleep));
        }
        assert_eq!(journal.entries(), expected);
    }

    #[test]
    fn test_redirected_device_gets_one_write() {
        let journal = Journal::new();
        let (_, pacing) = steady(&journal);
        let mut stream =
            TimedStream::with_pacing(Tty::redirected("out", &journal), Speed::DEFAULT, &pacing);
        stream.write_str("Dramatic?\n").unwrap();
        assert_eq!(journal.writes("out"), vec![b"Dramatic?\n".to_vec()]);
        assert!(journal.sleeps().is_empty());
    }

    #[test]
    fn test_interrupt_skips_rest_of_write_and_cooldown() {
        let journal = Journal::new();
        let (clock, mut stream) = terminal(&journal, 75.0);

        clock.interrupt_on(5);
        stream.write_str("Dramatic?\n").unwrap();
        assert_eq!(
            journal.trace(),
            [["out", "sleep"].repeat(5), vec!["out"; 5]].concat()
        );

        journal.clear();
        stream.write_str("Hello!\n").unwrap();
        assert_eq!(journal.trace(), vec!["out"; 7]);

        journal.clear();
        clock.advance(COOLDOWN);
        stream.write_str("ok").unwrap();
        assert_eq!(journal.trace(), vec!["out", "sleep", "out", "sleep"]);
        assert_eq!(journal.written("out"), b"ok");
    }

    #[test]
    fn test_interrupted_write_still_emits_everything() {
        let journal = Journal::new();
        let (clock, mut stream) = terminal(&journal, 75.0);
        clock.interrupt_on(1);
        stream.write_str("Dramatic?\n").unwrap();
        assert_eq!(journal.written("out"), b"Dramatic?\n");
        assert_eq!(journal.sleeps().len(), 1);
    }

    #[test]
    fn test_slow_device_never_sleeps_negative() {
        struct Sluggish {
            clock: Rc<ManualClock>,
            inner: Tty,
        }
        impl fmt::Debug for Sluggish {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("Sluggish")
            }
        }
        impl Write for Sluggish {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.clock.advance(Duration::from_millis(100));
                self.inner.write(buf)
            }
            fn flush(&mut self) -> io::Result<()> {
                self.inner.flush()
            }
        }
        impl Device for Sluggish {
            fn is_terminal(&self) -> bool {
                true
            }
        }

        let journal = Journal::new();
        let (clock, pacing) = steady(&journal);
        let device = Sluggish {
            clock: clock.clone(),
            inner: Tty::terminal("out", &journal),
        };
        let mut stream = TimedStream::with_pacing(device, Speed::DEFAULT, &pacing);
        stream.write_str("abc").unwrap();
        assert!(journal.sleeps().is_empty());
        assert_eq!(journal.written("out"), b"abc");
    }

    #[test]
    fn test_elapsed_time_is_subtracted() {
        let journal = Journal::new();
        let (clock, pacing) = steady(&journal);
        let device = Tty::terminal("out", &journal);
        let mut stream = TimedStream::with_pacing(device, Speed::new(10.0).unwrap(), &pacing);

        // Nothing elapses during the write, so the full interval is slept.
        stream.write_str("a").unwrap();
        assert_eq!(journal.sleeps(), vec![Duration::from_millis(100)]);
        assert_eq!(clock.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_multiplier_scales_interval() {
        let journal = Journal::new();
        let clock = Rc::new(ManualClock::new(&journal));
        let pacing = Pacing::natural()
            .with_clock(clock)
            .with_model(|| Box::new(Typist::with_variation(NoVariation)));
        let mut stream = TimedStream::with_pacing(
            Tty::terminal("out", &journal),
            Speed::new(10.0).unwrap(),
            &pacing,
        );
        stream.write_str("a ").unwrap();
        // 'a' is on the home row, the trailing space is a word break.
        let expected: Vec<Duration> = [0.1, 0.13]
            .iter()
            .map(|s| Duration::from_secs_f64(*s))
            .collect();
        let actual = journal.sleeps();
        for (a, e) in actual.iter().zip(&expected) {
            assert!(a.abs_diff(*e) < Duration::from_micros(1), "{a:?} vs {e:?}");
        }
        assert_eq!(actual.len(), 2);
    }

    #[test]
    fn test_io_write_reassembles_split_utf8() {
        let journal = Journal::new();
        let (_, mut stream) = terminal(&journal, 75.0);
        let snowman = "☃".as_bytes();
        stream.write_all(&snowman[..1]).unwrap();
        assert!(journal.writes("out").is_empty());
        stream.write_all(&snowman[1..]).unwrap();
        assert_eq!(journal.writes("out"), per_char("☃"));
        assert_eq!(journal.sleeps().len(), 1);
    }

    #[test]
    fn test_write_str_sends_held_bytes_first() {
        let journal = Journal::new();
        let (_, mut stream) = terminal(&journal, 75.0);
        stream.write_all(&[0xE2]).unwrap();
        stream.write_str("ab").unwrap();
        assert_eq!(
            journal.writes("out"),
            vec![vec![0xE2], b"a".to_vec(), b"b".to_vec()]
        );
        assert!(stream.partial.is_empty());
    }

    #[test]
    fn test_failed_io_write_keeps_held_bytes() {
        #[derive(Debug)]
        struct Fragile {
            budget: usize,
            written: Vec<u8>,
        }
        impl Write for Fragile {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.budget == 0 {
                    return Err(io::Error::from(io::ErrorKind::BrokenPipe));
                }
                self.budget -= 1;
                self.written.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        impl Device for Fragile {
            fn is_terminal(&self) -> bool {
                true
            }
        }

        let journal = Journal::new();
        let (_, pacing) = steady(&journal);
        let device = Fragile {
            budget: 2,
            written: Vec::new(),
        };
        let mut stream = TimedStream::with_pacing(device, Speed::DEFAULT, &pacing);
        let snowman = "☃".as_bytes();

        stream.write_all(&[b'x', snowman[0]]).unwrap();
        assert_eq!(stream.partial, vec![snowman[0]]);

        let mut rest = snowman[1..].to_vec();
        rest.push(b'y');
        let err = stream.write(&rest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(stream.partial, vec![snowman[0]]);
        assert_eq!(stream.get_ref().written, "x☃".as_bytes());
    }

    #[test]
    fn test_io_write_replaces_invalid_bytes() {
        let journal = Journal::new();
        let (_, mut stream) = terminal(&journal, 75.0);
        stream.write_all(b"a\xffb").unwrap();
        assert_eq!(journal.writes("out"), per_char("a\u{FFFD}b"));
    }

    #[test]
    fn test_io_write_passes_bytes_through_when_redirected() {
        let journal = Journal::new();
        let (_, pacing) = steady(&journal);
        let mut stream =
            TimedStream::with_pacing(Tty::redirected("out", &journal), Speed::DEFAULT, &pacing);
        write!(stream, "{}-{}", 1, 2).unwrap();
        assert_eq!(journal.written("out"), b"1-2");
        assert!(journal.sleeps().is_empty());
    }

    #[test]
    fn test_into_inner_returns_device_with_pending_bytes() {
        let mut stream = TimedStream::new(Vec::new(), Speed::DEFAULT);
        stream.partial.push(0xE2);
        let device = stream.into_inner();
        assert_eq!(device, vec![0xE2]);
    }

    #[test]
    fn test_into_inner_ignores_closed_device() {
        #[derive(Debug)]
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
        }
        impl Device for Closed {
            fn is_terminal(&self) -> bool {
                false
            }
        }

        let mut stream = TimedStream::new(Closed, Speed::DEFAULT);
        stream.partial.push(0xE2);
        let _device: Closed = stream.into_inner();
    }

    #[test]
    fn test_device_errors_propagate() {
        #[derive(Debug)]
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        impl Device for Broken {
            fn is_terminal(&self) -> bool {
                true
            }
        }
        let mut stream = TimedStream::new(Broken, Speed::DEFAULT);
        assert_eq!(stream.write_str("x").unwrap_err().to_string(), "gone");
    }

    #[test]
    fn test_debug_shows_device() {
        let journal = Journal::new();
        let (_, stream) = terminal(&journal, 75.0);
        assert_eq!(format!("{stream:?}"), "TimedStream(Tty(out))");
    }

    #[test]
    fn test_incomplete_tail() {
        assert_eq!(incomplete_tail(b"abc"), 0);
        assert_eq!(incomplete_tail(&[b'a', 0xE2]), 1);
        assert_eq!(incomplete_tail(&[b'a', 0xE2, 0x98]), 2);
        assert_eq!(incomplete_tail("☃".as_bytes()), 0);
        assert_eq!(incomplete_tail(&[0xF0, 0x9F, 0x98]), 3);
    }
}
