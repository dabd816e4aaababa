//! Compact single-line text rendering used by the `Display` impls.
//!
//! Output looks like `node_id:1 addr:<network_field:"tcp" address_field:"h:1">`.
//! Scalars are only rendered by callers when they are set.

use std::fmt;

pub(crate) struct TextFields<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    first: bool,
}

impl<'a, 'b> TextFields<'a, 'b> {
    pub(crate) fn new(f: &'a mut fmt::Formatter<'b>) -> Self {
        Self { f, first: true }
    }

    fn separator(&mut self) -> fmt::Result {
        if !self.first {
            self.f.write_str(" ")?;
        }
        self.first = false;
        Ok(())
    }

    pub(crate) fn scalar(&mut self, name: &str, value: impl fmt::Display) -> fmt::Result {
        self.separator()?;
        write!(self.f, "{}:{}", name, value)
    }

    pub(crate) fn string(&mut self, name: &str, value: &str) -> fmt::Result {
        self.separator()?;
        write!(self.f, "{}:{:?}", name, value)
    }

    pub(crate) fn bytes(&mut self, name: &str, value: &[u8]) -> fmt::Result {
        self.separator()?;
        write!(self.f, "{}:\"", name)?;
        for b in value {
            if b.is_ascii_graphic() && *b != b'"' && *b != b'\\' {
                write!(self.f, "{}", *b as char)?;
            } else {
                write!(self.f, "\\x{:02x}", b)?;
            }
        }
        self.f.write_str("\"")
    }

    pub(crate) fn message(&mut self, name: &str, value: &impl fmt::Display) -> fmt::Result {
        self.separator()?;
        write!(self.f, "{}:<{}>", name, value)
    }

    /// One `name:<key:K value:V>` group per map entry.
    pub(crate) fn entry(
        &mut self,
        name: &str,
        key: impl fmt::Display,
        value: impl fmt::Display,
    ) -> fmt::Result {
        self.separator()?;
        write!(self.f, "{}:<key:{} value:{}>", name, key, value)
    }
}
