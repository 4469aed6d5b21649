//! Running totals for a download run.

/// One recorded failure: what failed and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub label: String,
    pub reason: String,
}

/// Accumulated result of one traversal. Composed by the caller: each
/// traversal returns its own summary and parents merge child summaries in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub total_folders: u64,
    pub total_files: u64,
    pub failures: Vec<Failure>,
}

impl DownloadSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed unit of work. Failures are kept in encounter order.
    pub fn add_failure(&mut self, label: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(Failure {
            label: label.into(),
            reason: reason.into(),
        });
    }

    /// Fold another summary into this one: counts add, failures append.
    pub fn merge(&mut self, other: DownloadSummary) {
        self.total_folders += other.total_folders;
        self.total_files += other.total_files;
        self.failures.extend(other.failures);
    }
}

impl std::fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Download Summary:")?;
        writeln!(f, "Total downloaded folders: {}", self.total_folders)?;
        writeln!(f, "Total downloaded files: {}", self.total_files)?;
        write!(f, "Total failed downloads: {}", self.failures.len())?;
        if !self.failures.is_empty() {
            write!(f, "\n\nFailed Downloads Details:")?;
            for failure in &self.failures {
                write!(f, "\nFile: {}, Reason: {}", failure.label, failure.reason)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_adds_fields_and_appends_failures() {
        let mut a = DownloadSummary {
            total_folders: 2,
            total_files: 3,
            failures: vec![Failure {
                label: "a".to_string(),
                reason: "x".to_string(),
            }],
        };
        let b = DownloadSummary {
            total_folders: 1,
            total_files: 5,
            failures: vec![Failure {
                label: "b".to_string(),
                reason: "y".to_string(),
            }],
        };

        a.merge(b);

        assert_eq!(a.total_folders, 3);
        assert_eq!(a.total_files, 8);
        assert_eq!(a.failures.len(), 2);
        assert_eq!(a.failures[0].label, "a");
        assert_eq!(a.failures[1].label, "b");
    }

    #[test]
    fn test_merge_empty_is_identity() {
        let mut a = DownloadSummary::new();
        a.total_files = 4;
        a.merge(DownloadSummary::new());
        assert_eq!(a.total_files, 4);
        assert!(a.failures.is_empty());
    }

    #[test]
    fn test_display_lists_failures() {
        let mut summary = DownloadSummary::new();
        summary.total_files = 1;
        summary.add_failure("notes.pdf", "API error (403): denied");

        let text = summary.to_string();
        assert!(text.contains("Total downloaded files: 1"));
        assert!(text.contains("Total failed downloads: 1"));
        assert!(text.contains("File: notes.pdf, Reason: API error (403): denied"));
    }

    #[test]
    fn test_display_without_failures_has_no_details() {
        let summary = DownloadSummary::new();
        assert!(!summary.to_string().contains("Failed Downloads Details"));
    }
}
