//! Collected validation results

use crate::error::{ErrorEntry, ErrorKind};

/// Validation report
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Record a mapping error; unexpected keys only warrant a warning
    pub fn add_entry(&mut self, entry: &ErrorEntry) {
        match entry.kind {
            ErrorKind::UnexpectedKey => self.add_warning(&entry.path, &entry.message),
            _ => self.add_error(&entry.path, &entry.message),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!(
            "Validation: {} errors, {} warnings",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert!(!report.has_warnings());
        assert_eq!(report.summary(), "Validation: 0 errors, 0 warnings");
    }

    #[test]
    fn test_entries_are_classified() {
        let mut report = ValidationReport::new();
        report.add_entry(&ErrorEntry::new(
            ErrorKind::UnexpectedKey,
            "",
            "Unexpected key 'extra' was found",
        ));
        report.add_entry(&ErrorEntry::new(
            ErrorKind::KeyNotFound,
            "port",
            "Required key 'port' is missing",
        ));

        assert!(!report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors[0].field, "port");
        assert_eq!(report.summary(), "Validation: 1 errors, 1 warnings");
    }
}
