//! The logging capability the tracker is configured with.

use super::event::{Details, OriginalError};

/// Narrow logging collaborator: plain operational messages plus one-line
/// error summaries. Both are local and synchronous.
pub trait ErrorLogger: Send + Sync {
    fn info(&self, message: &str);

    fn error(&self, error_id: &str, error: &OriginalError, context: &str, details: &Details);
}

/// Render the one-line `id | context | error message` summary.
pub fn summary_line(error_id: &str, context: &str, error: &OriginalError) -> String {
    format!("{error_id} | {context} | {error}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let line = summary_line("ERR-1", "payment processing failed", &OriginalError::new("insufficient funds"));
        assert_eq!(line, "ERR-1 | payment processing failed | insufficient funds");
    }
}
