use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `ResistanceError` and maps to other errors to
/// convert to a `ResistanceError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ResistanceError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    /// The model was configured in a way that cannot be run.
    ConfigError(String),
    /// A drug name was looked up that is not in the formulary.
    UnknownDrug(String),
    ReportError(String),
}

impl From<io::Error> for ResistanceError {
    fn from(error: io::Error) -> Self {
        ResistanceError::IoError(error)
    }
}

impl From<serde_json::Error> for ResistanceError {
    fn from(error: serde_json::Error) -> Self {
        ResistanceError::JsonError(error)
    }
}

impl From<csv::Error> for ResistanceError {
    fn from(error: csv::Error) -> Self {
        ResistanceError::CsvError(error)
    }
}

impl std::error::Error for ResistanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResistanceError::IoError(error) => Some(error),
            ResistanceError::JsonError(error) => Some(error),
            ResistanceError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for ResistanceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResistanceError::IoError(error) => write!(f, "I/O error: {error}"),
            ResistanceError::JsonError(error) => write!(f, "JSON error: {error}"),
            ResistanceError::CsvError(error) => write!(f, "CSV error: {error}"),
            ResistanceError::ConfigError(msg) => write!(f, "invalid configuration: {msg}"),
            ResistanceError::UnknownDrug(name) => write!(f, "unknown drug: {name:?}"),
            ResistanceError::ReportError(msg) => write!(f, "report error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_and_keep_source() {
        let error: ResistanceError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(error, ResistanceError::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn display_names_the_drug() {
        let error = ResistanceError::UnknownDrug("Vancomycin".to_string());
        assert_eq!(error.to_string(), "unknown drug: \"Vancomycin\"");
    }
}
