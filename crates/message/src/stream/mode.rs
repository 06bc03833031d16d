use std::fs::OpenOptions;

use super::StreamError;

/// An `fopen` style open mode such as `"r"`, `"w+"` or `"a"`.
///
/// The binary and text flags `b` and `t` are accepted and ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OpenMode {
    base: u8,
    plus: bool,
}

impl OpenMode {
    pub const READ_EXISTING: &'static str = "r";
    pub const READ_WRITE_EXISTING: &'static str = "r+";
    pub const WRITE_TRUNCATE: &'static str = "w";
    pub const READ_WRITE_TRUNCATE: &'static str = "w+";
    pub const WRITE_APPEND_ONLY: &'static str = "a";
    pub const READ_WRITE_APPEND_ONLY: &'static str = "a+";
    pub const WRITE_NOT_EXISTING: &'static str = "x";
    pub const READ_WRITE_NOT_EXISTING: &'static str = "x+";
    pub const OVERWRITE: &'static str = "c";
    pub const OVERWRITE_WITH_READ: &'static str = "c+";

    /// Parses a mode string.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidMode`] for anything but `r`, `w`, `a`, `x` or `c`,
    /// optionally followed by `+`.
    pub fn parse(mode: &str) -> Result<Self, StreamError> {
        let filtered: Vec<u8> = mode.bytes().filter(|b| !matches!(b, b'b' | b't')).collect();
        match filtered.as_slice() {
            [base @ (b'r' | b'w' | b'a' | b'x' | b'c')] => Ok(Self { base: *base, plus: false }),
            [base @ (b'r' | b'w' | b'a' | b'x' | b'c'), b'+'] => Ok(Self { base: *base, plus: true }),
            _ => Err(StreamError::InvalidMode(mode.to_owned())),
        }
    }

    #[inline]
    pub fn is_readable(self) -> bool {
        self.base == b'r' || self.plus
    }

    #[inline]
    pub fn is_writable(self) -> bool {
        self.base != b'r' || self.plus
    }

    /// Returns the [`OpenOptions`] matching this mode.
    pub fn open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable());
        match self.base {
            b'w' => {
                options.write(true).create(true).truncate(true);
            }
            b'a' => {
                options.append(true).create(true);
            }
            b'x' => {
                options.write(true).create_new(true);
            }
            b'c' => {
                options.write(true).create(true).truncate(false);
            }
            _ => {
                options.write(self.plus);
            }
        }
        options
    }
}

impl std::fmt::Display for OpenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.base as char, if self.plus { "+" } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities() {
        let cases = [
            ("r", true, false),
            ("r+", true, true),
            ("w", false, true),
            ("w+", true, true),
            ("a", false, true),
            ("a+", true, true),
            ("x", false, true),
            ("x+", true, true),
            ("c", false, true),
            ("c+", true, true),
            ("rb", true, false),
            ("w+b", true, true),
        ];

        for (mode, readable, writable) in cases {
            let parsed = OpenMode::parse(mode).unwrap();
            assert_eq!(parsed.is_readable(), readable, "{mode}");
            assert_eq!(parsed.is_writable(), writable, "{mode}");
        }
    }

    #[test]
    fn invalid_modes() {
        for mode in ["", "z", "r++", "+r", "rw"] {
            assert!(matches!(OpenMode::parse(mode), Err(StreamError::InvalidMode(_))), "{mode}");
        }
    }

    #[test]
    fn display() {
        assert_eq!(OpenMode::parse("w+b").unwrap().to_string(), "w+");
        assert_eq!(OpenMode::parse("r").unwrap().to_string(), "r");
    }
}
