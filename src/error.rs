//! Provides [`SimError`] and maps other errors to
//! convert to a [`SimError`].
use std::fmt::{self, Debug, Display};
use std::io;

#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    /// A construction or step input violates a documented constraint.
    IllegalParameter(String),
    ReportError(String),
    SimError(String),
}

impl From<io::Error> for SimError {
    fn from(error: io::Error) -> Self {
        SimError::IoError(error)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(error: serde_json::Error) -> Self {
        SimError::JsonError(error)
    }
}

impl From<csv::Error> for SimError {
    fn from(error: csv::Error) -> Self {
        SimError::CsvError(error)
    }
}

impl From<String> for SimError {
    fn from(error: String) -> Self {
        SimError::SimError(error)
    }
}

impl From<&str> for SimError {
    fn from(error: &str) -> Self {
        SimError::SimError(error.to_string())
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::IoError(error) => Some(error),
            SimError::JsonError(error) => Some(error),
            SimError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::IllegalParameter(message) => write!(f, "Illegal parameter: {message}"),
            SimError::ReportError(message) => write!(f, "Report error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_str_and_string() {
        let error: SimError = "bad thing".into();
        assert!(matches!(error, SimError::SimError(ref m) if m == "bad thing"));

        let error: SimError = String::from("other thing").into();
        assert!(matches!(error, SimError::SimError(ref m) if m == "other thing"));
    }

    #[test]
    fn io_error_keeps_source() {
        let error: SimError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn illegal_parameter_display_names_the_problem() {
        let error = SimError::IllegalParameter("population must be non-negative".to_string());
        assert_eq!(
            error.to_string(),
            "Illegal parameter: population must be non-negative"
        );
    }
}
