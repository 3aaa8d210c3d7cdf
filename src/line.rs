//! [`Line`], print-style formatting of several values into a single write.

use std::fmt;
use std::io::{self, Write};

/// Values joined by a separator and closed by a terminator, the way `print`
/// functions in many languages format their arguments.
///
/// ```
/// use dramatic::Line;
///
/// let line = Line::of(["This", "is", "dramatic"]).sep("---").end("!\n");
/// assert_eq!(line.to_string(), "This---is---dramatic!\n");
/// assert_eq!(Line::new().value(1).value(2.5).to_string(), "1 2.5\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    values: Vec<String>,
    sep: String,
    end: String,
}

impl Line {
    /// No values, `" "` separator, `"\n"` terminator.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            sep: " ".to_string(),
            end: "\n".to_string(),
        }
    }

    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        values.into_iter().fold(Self::new(), Self::value)
    }

    pub fn value(mut self, value: impl fmt::Display) -> Self {
        self.values.push(value.to_string());
        self
    }

    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    /// Write the whole line to `out` in one call, without any pacing of its
    /// own. Whether it is typed out depends only on `out`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.to_string().as_bytes())
    }

    /// Type the line out on standard output. See [`crate::print`].
    pub fn print(&self) -> io::Result<()> {
        crate::global::print(self)
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(&self.sep)?;
            }
            f.write_str(value)?;
        }
        f.write_str(&self.end)
    }
}
