use std::fmt;

/// How serious a reported failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// The caller can recover, e.g. by retrying with a smaller step.
    Warning,
    /// The operation cannot continue.
    Error,
}

/// A failure reported at the point where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub severity: Severity,
    /// Component that detected the failure.
    pub component: &'static str,
    /// Operation that was running.
    pub operation: &'static str,
    pub message: String,
}

impl Report {
    /// Creates a report with [`Severity::Error`].
    pub fn error(
        component: &'static str,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            component,
            operation,
            message: message.into(),
        }
    }

    /// Creates a report with [`Severity::Warning`].
    pub fn warning(
        component: &'static str,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            component,
            operation,
            message: message.into(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.component, self.operation, self.message
        )
    }
}

/// Receives a [`Report`] on every error path.
///
/// Reporters only observe; they never change the outcome that is returned
/// to the caller and must not panic.
///
/// Closures implement `Reporter`, and `()` is a reporter that discards
/// everything.
pub trait Reporter {
    fn report(&mut self, report: &Report);
}

/// Blanket implementation for reporter closures.
impl<F> Reporter for F
where
    F: FnMut(&Report),
{
    fn report(&mut self, report: &Report) {
        self(report);
    }
}

/// A no-op reporter.
impl Reporter for () {
    fn report(&mut self, _report: &Report) {}
}

/// Forwards reports to the [`log`] facade.
///
/// Warnings are logged at `warn` level and errors at `error` level, with the
/// component as the log target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, report: &Report) {
        let level = match report.severity {
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        };
        log::log!(
            target: report.component,
            level,
            "{}: {}",
            report.operation,
            report.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_receives_reports() {
        let mut seen = Vec::new();
        let mut reporter = |report: &Report| seen.push(report.clone());

        reporter.report(&Report::warning("corrector", "residual", "rhs failed"));
        reporter.report(&Report::error("corrector", "linear_solve", "singular"));

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].severity, Severity::Warning);
        assert_eq!(seen[1].operation, "linear_solve");
    }

    #[test]
    fn display_includes_context() {
        let report = Report::error("corrector", "init", "no solver");
        assert_eq!(report.to_string(), "[corrector] init: no solver");
    }

    #[test]
    fn unit_and_log_reporters_accept_reports() {
        let report = Report::error("corrector", "init", "no solver");
        ().report(&report);
        LogReporter.report(&report);
    }
}
