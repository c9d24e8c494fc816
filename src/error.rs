//! Defines error and its location
use std::{fmt, io};

use saphyr_parser::ScanError;

use crate::budget::BudgetBreach;
use crate::location::Location;
use crate::raw::AnchorId;

/// Broad error category, useful to decide how a failure should be handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// API misuse: wrong accessor for the current event, key outside a mapping,
    /// write after close and similar. Never caused by the input text.
    Usage,
    /// Malformed or hostile source document. Carries a location when known.
    Parse,
    /// Failure of the underlying reader, writer or formatter.
    Io,
}

/// Error type shared by the event translator and the event emitter.
#[derive(Debug)]
pub enum Error {
    /// The API was used in a way the current state does not allow.
    Usage { msg: String },
    /// Free-form parse error with optional source location.
    Message { msg: String, location: Location },
    /// Alias references an anchor that is not defined in this document.
    ///
    /// `name` is the anchor name as written, when the source can tell it.
    UnknownAnchor {
        id: AnchorId,
        name: Option<String>,
        location: Location,
    },
    /// Alias inside the node its anchor is attached to.
    RecursiveAlias {
        id: AnchorId,
        name: Option<String>,
        location: Location,
    },
    /// Expanding the alias would produce at least the configured number of scalars.
    ExpansionLimit {
        anchor: AnchorId,
        name: Option<String>,
        size: usize,
        location: Location,
    },
    /// A YAML budget limit was exceeded.
    Budget {
        breach: BudgetBreach,
        location: Location,
    },
    /// I/O failure of the source or sink.
    IOError { cause: io::Error },
    /// Wrapper for formatting errors.
    Format { error: fmt::Error },
}

impl Error {
    /// Construct a `Message` error with no known location.
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct a usage error.
    pub(crate) fn usage<S: Into<String>>(s: S) -> Self {
        Error::Usage { msg: s.into() }
    }

    /// Construct an `UnknownAnchor` error for the given anchor id (unknown location).
    pub(crate) fn unknown_anchor(id: AnchorId) -> Self {
        Error::UnknownAnchor {
            id,
            name: None,
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn recursive_alias(id: AnchorId) -> Self {
        Error::RecursiveAlias {
            id,
            name: None,
            location: Location::UNKNOWN,
        }
    }

    /// Fill in the anchor name of alias errors that only know the id.
    pub(crate) fn with_anchor_name(mut self, anchor_name: Option<&str>) -> Self {
        match &mut self {
            Error::UnknownAnchor { name, .. }
            | Error::RecursiveAlias { name, .. }
            | Error::ExpansionLimit { name, .. } => {
                if name.is_none() {
                    *name = anchor_name.map(str::to_owned);
                }
            }
            _ => {}
        }
        self
    }

    pub(crate) fn budget(breach: BudgetBreach) -> Self {
        Error::Budget {
            breach,
            location: Location::UNKNOWN,
        }
    }

    /// Attach/override a concrete location to this error and return it.
    ///
    /// Errors without a source position (usage and I/O) are returned unchanged.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Message { location, .. }
            | Error::UnknownAnchor { location, .. }
            | Error::RecursiveAlias { location, .. }
            | Error::ExpansionLimit { location, .. }
            | Error::Budget { location, .. } => {
                *location = set_location;
            }
            Error::Usage { .. } | Error::IOError { .. } | Error::Format { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Message { location, .. }
            | Error::UnknownAnchor { location, .. }
            | Error::RecursiveAlias { location, .. }
            | Error::ExpansionLimit { location, .. }
            | Error::Budget { location, .. } => {
                if location.is_unknown() {
                    None
                } else {
                    Some(*location)
                }
            }
            Error::Usage { .. } | Error::IOError { .. } | Error::Format { .. } => None,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Usage { .. } => ErrorKind::Usage,
            Error::Message { .. }
            | Error::UnknownAnchor { .. }
            | Error::RecursiveAlias { .. }
            | Error::ExpansionLimit { .. }
            | Error::Budget { .. } => ErrorKind::Parse,
            Error::IOError { .. } | Error::Format { .. } => ErrorKind::Io,
        }
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        Error::Message {
            msg: err.info().to_owned(),
            location: Location::new(mark.line(), mark.col() + 1, mark.index()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage { msg } => f.write_str(msg),
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::UnknownAnchor { id, name, location } => fmt_with_location(
                f,
                &format!("{} refers to an unknown anchor", alias_label(*id, name.as_deref())),
                location,
            ),
            Error::RecursiveAlias { id, name, location } => fmt_with_location(
                f,
                &format!(
                    "{} is inside the node its anchor is attached to",
                    alias_label(*id, name.as_deref())
                ),
                location,
            ),
            Error::ExpansionLimit {
                anchor,
                name,
                size,
                location,
            } => fmt_with_location(
                f,
                &format!(
                    "{} expands to too many scalars: {size}",
                    alias_label(*anchor, name.as_deref())
                ),
                location,
            ),
            Error::Budget { breach, location } => {
                fmt_with_location(f, &format!("YAML budget breached: {breach}"), location)
            }
            Error::IOError { cause } => write!(f, "I/O error: {cause}"),
            Error::Format { error } => write!(f, "formatting error: {error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError { cause } => Some(cause),
            Error::Format { error } => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(cause: io::Error) -> Self {
        Error::IOError { cause }
    }
}

impl From<fmt::Error> for Error {
    fn from(error: fmt::Error) -> Self {
        Error::Format { error }
    }
}

/// `alias *name`, or the parser's anchor id when the name is not known.
pub(crate) fn alias_label(id: AnchorId, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("alias *{name}"),
        None => format!("alias of internal anchor id {id}"),
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location.is_unknown() {
        write!(f, "{msg}")
    } else {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.line, location.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_render_their_location() {
        let err = Error::msg("bad thing").with_location(Location::new(4, 2, 30));
        assert_eq!(err.to_string(), "bad thing at line 4, column 2");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.location(), Some(Location::new(4, 2, 30)));
    }

    #[test]
    fn usage_errors_ignore_locations() {
        let err = Error::usage("not in object context").with_location(Location::new(1, 1, 0));
        assert_eq!(err.to_string(), "not in object context");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.location().is_none());
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err = Error::from(io::Error::other("disk on fire"));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn expansion_limit_names_anchor_and_size() {
        let err = Error::ExpansionLimit {
            anchor: 7,
            name: None,
            size: 10_000,
            location: Location::UNKNOWN,
        };
        assert_eq!(
            err.to_string(),
            "alias of internal anchor id 7 expands to too many scalars: 10000"
        );
        let err = err.with_anchor_name(Some("lol")).with_location(Location::new(5, 4, 90));
        assert_eq!(
            err.to_string(),
            "alias *lol expands to too many scalars: 10000 at line 5, column 4"
        );
    }

    #[test]
    fn unknown_and_recursive_aliases() {
        let err = Error::unknown_anchor(3).with_anchor_name(Some("base"));
        assert_eq!(err.to_string(), "alias *base refers to an unknown anchor");
        let err = Error::recursive_alias(2);
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(
            err.to_string(),
            "alias of internal anchor id 2 is inside the node its anchor is attached to"
        );
    }
}
