//! Error adapter for converting [`CliError`] to miette diagnostics.
//!
//! Store errors carry their [`ErrorKind`] as the diagnostic code
//! (`cartograph::not_found`, `cartograph::type_mismatch`, ...), so scripted
//! callers can match on the code instead of the message.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use cartograph::ErrorKind;

use crate::CliError;

/// Adapter rendering a [`CliError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl ErrorAdapter<'_> {
    fn code_str(&self) -> &'static str {
        match self.0 {
            CliError::Graph(err) => match err.kind() {
                ErrorKind::NotFound => "cartograph::not_found",
                ErrorKind::TypeMismatch => "cartograph::type_mismatch",
                ErrorKind::DuplicateName => "cartograph::duplicate_name",
                ErrorKind::DuplicateRelationship => "cartograph::duplicate_relationship",
                ErrorKind::ImmutableState => "cartograph::immutable_state",
                ErrorKind::InvalidInput => "cartograph::invalid_input",
                ErrorKind::PersistenceFailure => "cartograph::persistence_failure",
            },
            CliError::Config(_) => "cartograph::config",
            CliError::Io(_) => "cartograph::io",
            CliError::Output(_) => "cartograph::output",
        }
    }

    fn help_str(&self) -> Option<&'static str> {
        let CliError::Graph(err) = self.0 else {
            return None;
        };
        match err.kind() {
            ErrorKind::TypeMismatch => {
                Some("each graph kind only accepts a fixed set of node and edge kinds")
            }
            ErrorKind::ImmutableState => {
                Some("archived graphs are read-only and root nodes cannot be deleted")
            }
            ErrorKind::NotFound => Some("run `cartograph list` to see existing graphs and nodes"),
            _ => None,
        }
    }
}

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_str()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
