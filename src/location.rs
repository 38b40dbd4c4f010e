use std::fmt;
use std::panic::Location;

/// Path segment marking the repository root. Call-site paths containing it are shortened to
/// the part after the marker.
pub const ROOT_MARKER: &str = concat!("/", env!("CARGO_PKG_NAME"), "/");

/// Source location of a logging call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSite<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl CallSite<'static> {
    /// Placeholder used when the caller cannot be determined.
    pub const UNKNOWN: CallSite<'static> = CallSite {
        file: "???",
        line: 0,
    };

    /// Location of the first caller up the stack that is not `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl<'a> CallSite<'a> {
    pub fn new(file: &'a str, line: u32) -> Self {
        Self { file, line }
    }

    pub fn relative_to(&self, marker: &str) -> CallSite<'a> {
        CallSite {
            file: strip_root(self.file, marker),
            line: self.line,
        }
    }
}

impl<'a> From<&'a Location<'a>> for CallSite<'a> {
    fn from(location: &'a Location<'a>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for CallSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Strip everything up to and including the first occurrence of `marker` from `path`.
///
/// ```
/// use sevlog::location::strip_root;
///
/// assert_eq!(strip_root("/x/y/app/pkg/file.rs", "/app/"), "pkg/file.rs");
/// assert_eq!(strip_root("/x/y/pkg/file.rs", "/app/"), "/x/y/pkg/file.rs");
/// ```
pub fn strip_root<'a>(path: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return path;
    }
    match path.find(marker) {
        Some(index) => &path[index + marker.len()..],
        None => path,
    }
}
