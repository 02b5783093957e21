use std::fmt;

/// Diagnostic severity. Mini only ever emits [`Level::Error`] (spec.md §7
/// names no warnings), but the three-way split keeps notes/helps attached
/// to an error rendering uniformly on the driver's stderr output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Note,
    Help,
}

impl Level {
    pub const fn is_error(&self) -> bool {
        matches!(self, Level::Error)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Note => "note",
            Level::Help => "help",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_error() {
        assert!(Level::Error.is_error());
        assert!(!Level::Note.is_error());
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(format!("{}", Level::Help), "help");
    }
}
