use std::path::PathBuf;

use langcsv::{FormatType, ImportIssue, ImportOptions, import};

use crate::{config::Config, exit_status::ExitStatus};

/// Arguments of `langcsv import`.
#[derive(Debug, Clone, Default)]
pub struct ImportCommand {
    pub path: Option<PathBuf>,
    pub json: bool,
    pub locale: Option<String>,
    pub dry_run: bool,
}

impl ImportCommand {
    pub fn options(&self, config: &Config) -> ImportOptions {
        let csv_path = self
            .path
            .clone()
            .unwrap_or_else(|| config.export_path.clone());
        let format = if self.json {
            FormatType::Json
        } else {
            FormatType::Php
        };
        ImportOptions::new(csv_path, &config.lang_path)
            .with_format(format)
            .with_locale(self.locale.clone())
            .with_dry_run(self.dry_run)
    }
}

pub fn run_import(config: &Config, command: &ImportCommand) -> ExitStatus {
    let options = command.options(config);
    let report = match import(&options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Import failed: {}", e);
            return ExitStatus::Error;
        }
    };

    let verb = if report.dry_run {
        "Would create"
    } else {
        "Created"
    };
    for file in &report.files {
        println!("{}: {}", verb, file.target.display());
    }
    for issue in &report.issues {
        match issue {
            ImportIssue::InvalidPath { .. } => {
                eprintln!("⚠️  Skipped {}: {}", issue.path(), issue.error())
            }
            ImportIssue::WriteFailed { .. } => {
                eprintln!("❌ Could not write {}: {}", issue.path(), issue.error())
            }
        }
    }

    let status = ExitStatus::of_import(&report);
    if status == ExitStatus::Failure {
        eprintln!(
            "❌ Imported translations from {} with errors",
            options.csv_path.display()
        );
    } else {
        println!(
            "✅ Imported translations from {}",
            options.csv_path.display()
        );
    }
    status
}
