//! Observable events for gridsql
//!
//! Events are explicit and typed; each one carries its own severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Compile
    /// Compile begins
    CompileStart,
    /// Compile produced a statement
    CompileComplete,
    /// Compile rejected the request
    CompileRejected,
    /// Filter with an unknown operator dropped from WHERE
    FilterIgnored,
    /// Pivot column with no supplied distinct values
    PivotValuesMissing,

    // Response
    /// Rows page shaped for the client
    ResponseShaped,

    // CLI
    /// Command ended on a configuration or I/O failure
    CommandFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CompileStart => "COMPILE_START",
            Event::CompileComplete => "COMPILE_COMPLETE",
            Event::CompileRejected => "COMPILE_REJECTED",
            Event::FilterIgnored => "FILTER_IGNORED",
            Event::PivotValuesMissing => "PIVOT_VALUES_MISSING",
            Event::ResponseShaped => "RESPONSE_SHAPED",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded => Severity::Info,
            Event::CompileStart | Event::CompileComplete | Event::ResponseShaped => {
                Severity::Trace
            }
            Event::CompileRejected | Event::FilterIgnored | Event::PivotValuesMissing => {
                Severity::Warn
            }
            Event::CommandFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::CompileStart,
            Event::CompileComplete,
            Event::CompileRejected,
            Event::FilterIgnored,
            Event::PivotValuesMissing,
            Event::ResponseShaped,
            Event::CommandFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_dropped_input_is_a_warning() {
        assert_eq!(Event::FilterIgnored.severity(), Severity::Warn);
        assert_eq!(Event::PivotValuesMissing.severity(), Severity::Warn);
        assert_eq!(Event::CompileComplete.severity(), Severity::Trace);
        assert_eq!(Event::CommandFailed.severity(), Severity::Error);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::CompileStart), "COMPILE_START");
    }
}
