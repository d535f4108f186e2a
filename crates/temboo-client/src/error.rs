use std::borrow::Cow;

use tracing::error;

/// All possible error kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The Temboo account name has not been set.
    AccountMissing,
    /// The choreo path has not been set.
    ChoreoMissing,
    /// The application key name has not been set.
    AppKeyNameMissing,
    /// The application key value has not been set.
    AppKeyMissing,
    /// Errors encountered while exchanging data with the server.
    Http,
}

impl ErrorKind {
    pub(crate) const fn description(self) -> &'static str {
        match self {
            Self::AccountMissing => "Account Missing",
            Self::ChoreoMissing => "Choreo Missing",
            Self::AppKeyNameMissing => "App Key Name Missing",
            Self::AppKeyMissing => "App Key Missing",
            Self::Http => "Http",
        }
    }

    /// Returns the numeric code associated with the error kind.
    ///
    /// A successful run has code [`SUCCESS`].
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::AccountMissing => 201,
            Self::ChoreoMissing => 203,
            Self::AppKeyNameMissing => 205,
            Self::AppKeyMissing => 207,
            Self::Http => 223,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.description().fmt(f)
    }
}

/// Numeric code of a successful run.
pub const SUCCESS: u16 = 0;

/// Choreo client error.
#[derive(PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    description: Cow<'static, str>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.format(f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.format(f)
    }
}

impl Error {
    /// Creates an [`Error`] from an [`ErrorKind`] and a description.
    #[inline]
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        let description = description.into();
        error!("{}", description.as_ref());
        Self { kind, description }
    }

    /// Returns the [`ErrorKind`].
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the numeric code of the error.
    #[must_use]
    #[inline]
    pub const fn code(&self) -> u16 {
        self.kind.code()
    }

    fn format(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Http, e.to_string())
    }
}

impl std::error::Error for Error {}

/// A specialized [`Result`] type for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
