//! [`Device`], the byte sink a timed stream writes to.

use std::fmt;
use std::fs::File;
use std::io::{self, IsTerminal, Write};

/// A writable byte sink that knows whether it is a live terminal.
///
/// Pacing only happens on terminals; everything else gets a plain write.
pub trait Device: Write + fmt::Debug {
    fn is_terminal(&self) -> bool;
}

impl Device for io::Stdout {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Device for io::Stderr {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Device for File {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Device for Vec<u8> {
    fn is_terminal(&self) -> bool {
        false
    }
}

impl Device for io::Sink {
    fn is_terminal(&self) -> bool {
        false
    }
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}

impl<D: Device + ?Sized> Device for &mut D {
    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}
