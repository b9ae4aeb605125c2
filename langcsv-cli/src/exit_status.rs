//! Process exit codes of the `langcsv` binary.

use std::process::ExitCode;

use langcsv::ImportReport;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Exit code 0. Skipped rows or unloadable source files still count.
    Success,
    /// Exit code 1. The import ran but at least one file was not written.
    Failure,
    /// Exit code 2. Nothing was done: missing CSV or lang directory,
    /// unwritable export destination, or an invalid `langcsv.toml`.
    Error,
}

impl ExitStatus {
    /// Status of a completed import run.
    pub fn of_import(report: &ImportReport) -> Self {
        if report.has_failures() {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }

    fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::Error => 2,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
