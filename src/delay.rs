//! Per-character delay model.
//!
//! A [`DelayModel`] turns a [`Keystroke`] (the character being typed plus its
//! neighbours and how deep into leading whitespace it sits) into a multiplier
//! of the base interval `1 / speed`. [`Typist`] is the heuristic used by
//! default; [`Steady`] types everything at the same pace.

use rand::Rng;
use rand::rngs::ThreadRng;
use rand_distr::StandardNormal;

const HOME_ROW: &str = "asdfghjkl;'";
const NUMERIC: &str = "1234567890.";
const CLAUSE_BREAKS: &str = ",.-;:!?—-()[]{}<>";
const SYMBOLS: &str = "`@#$%^&*_+='\"/‘’";

/// The smallest multiplier [`Typist`] ever returns.
pub const MIN_MULTIPLIER: f64 = 0.7;

/// One character in the context of the string being written.
///
/// `prev` is `None` at the start of the string and `next` is `None` at its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystroke {
    pub prev: Option<char>,
    pub current: char,
    pub next: Option<char>,
    /// Position inside a run of leading whitespace, see [`IndentRun`].
    pub indent: usize,
}

impl Keystroke {
    fn prev_in(&self, set: &str) -> bool {
        self.prev.is_some_and(|c| set.contains(c))
    }

    fn next_in(&self, set: &str) -> bool {
        self.next.is_some_and(|c| set.contains(c))
    }
}

/// Computes how slow a keystroke is relative to the base interval.
pub trait DelayModel {
    fn multiplier(&mut self, keystroke: &Keystroke) -> f64;
}

impl<M: DelayModel + ?Sized> DelayModel for Box<M> {
    fn multiplier(&mut self, keystroke: &Keystroke) -> f64 {
        (**self).multiplier(keystroke)
    }
}

/// Every character takes the same multiple of the base interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steady(pub f64);

impl Default for Steady {
    fn default() -> Self {
        Self(1.0)
    }
}

impl DelayModel for Steady {
    fn multiplier(&mut self, _keystroke: &Keystroke) -> f64 {
        self.0
    }
}

/// Source of the randomized terms in [`Typist`].
pub trait Variation {
    /// Extra pause after clause-breaking punctuation.
    fn punctuation_pause(&mut self) -> f64;

    /// Small smoothing term added to most characters.
    fn jitter(&mut self) -> f64;

    /// Occasional long hesitation, zero most of the time.
    fn hesitation(&mut self) -> f64;
}

/// Draws the randomized terms from normal distributions.
#[derive(Debug, Clone)]
pub struct RandomVariation<R = ThreadRng> {
    rng: R,
}

impl RandomVariation {
    pub fn new() -> Self {
        Self::from_rng(rand::thread_rng())
    }
}

impl Default for RandomVariation {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomVariation<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }
}

impl<R: Rng> Variation for RandomVariation<R> {
    fn punctuation_pause(&mut self) -> f64 {
        self.normal(8.0, 5.0).max(6.0)
    }

    fn jitter(&mut self) -> f64 {
        self.normal(0.0, 0.4).clamp(0.3, 5.0)
    }

    fn hesitation(&mut self) -> f64 {
        if self.rng.gen_bool(0.03) {
            self.normal(3.0, 3.0).max(0.0)
        } else {
            0.0
        }
    }
}

/// Every randomized term is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariation;

impl Variation for NoVariation {
    fn punctuation_pause(&mut self) -> f64 {
        0.0
    }

    fn jitter(&mut self) -> f64 {
        0.0
    }

    fn hesitation(&mut self) -> f64 {
        0.0
    }
}

/// Types like a person: slower away from the home row, on shifted keys, at
/// line breaks, inside long numbers and around punctuation.
#[derive(Debug, Clone, Default)]
pub struct Typist<V = RandomVariation> {
    variation: V,
}

impl Typist {
    pub fn new() -> Self {
        Self::with_variation(RandomVariation::new())
    }
}

impl<V: Variation> Typist<V> {
    pub fn with_variation(variation: V) -> Self {
        Self { variation }
    }
}

impl<V: Variation> DelayModel for Typist<V> {
    fn multiplier(&mut self, keystroke: &Keystroke) -> f64 {
        let current = keystroke.current;
        let mut mult = 1.0;

        if !HOME_ROW.contains(current) {
            mult += 0.2;
        }

        // Pressing shift costs more than keeping it held.
        if current.is_uppercase() {
            mult += if keystroke.prev.is_some_and(char::is_uppercase) {
                0.08
            } else {
                0.25
            };
        }

        if current == ' ' {
            match keystroke.indent {
                0 => return 1.3,
                n if n % 4 != 0 => return 0.8,
                // Pause once per level of indentation.
                _ => mult += 5.0,
            }
        } else if current == '\n' && keystroke.prev != Some('\n') && keystroke.next != Some('\n')
        {
            mult += 5.0;
        } else if NUMERIC.contains(current) && keystroke.next_in(NUMERIC) {
            mult += 5.0;
            if keystroke.prev_in(NUMERIC) {
                mult += 2.0;
            }
        } else if CLAUSE_BREAKS.contains(current) {
            mult += self.variation.punctuation_pause();
        } else if SYMBOLS.contains(current) {
            mult += 4.0;
        }

        mult += self.variation.jitter();
        mult += self.variation.hesitation();

        mult.max(MIN_MULTIPLIER)
    }
}

/// Tracks how deep into a run of leading whitespace the current character is.
///
/// Starts at 1, as if at the start of a line. Each space or tab at the start
/// of a line increments it, `\r` and `\n` reset it to 1, and anything else
/// drops it to 0 until the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentRun(usize);

impl IndentRun {
    pub const fn new() -> Self {
        Self(1)
    }

    /// Account for `c` and return the indentation it is typed at.
    pub fn advance(&mut self, c: char) -> usize {
        match c {
            '\r' | '\n' => self.0 = 1,
            ' ' | '\t' if self.0 > 0 => self.0 += 1,
            ' ' | '\t' => {}
            _ => self.0 = 0,
        }
        self.0
    }
}

impl Default for IndentRun {
    fn default() -> Self {
        Self::new()
    }
}
