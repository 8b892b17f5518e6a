//! Driver errors: bad command lines and unreadable files.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot find file '{path}'")]
    NotFound { path: String },

    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: String },

    #[error("'{path}' contains invalid UTF-8 data")]
    InvalidUtf8 { path: String },

    #[error("error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for {flag}, expected {expected}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("missing {0}")]
    MissingArgument(&'static str),
}

impl CliError {
    /// Classify a failed read of `path`.
    pub fn read(path: &str, err: io::Error) -> Self {
        let path = path.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => CliError::NotFound { path },
            io::ErrorKind::PermissionDenied => CliError::PermissionDenied { path },
            io::ErrorKind::InvalidData => CliError::InvalidUtf8 { path },
            _ => CliError::Io { path, source: err },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use std::io;

    #[test]
    fn read_errors_are_classified() {
        let missing = CliError::read("a.d", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(missing.to_string(), "cannot find file 'a.d'");

        let other = CliError::read("a.d", io::Error::other("disk on fire"));
        assert_eq!(other.to_string(), "error reading 'a.d': disk on fire");
    }
}
