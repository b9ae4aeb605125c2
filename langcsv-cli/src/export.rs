use std::path::PathBuf;

use langcsv::{ExportOptions, FormatType, LocaleFilter, export};

use crate::{config::Config, exit_status::ExitStatus};

/// Arguments of `langcsv export`.
#[derive(Debug, Clone, Default)]
pub struct ExportCommand {
    pub path: Option<PathBuf>,
    pub locales: Option<String>,
    pub all: bool,
    pub json: bool,
}

impl ExportCommand {
    pub fn options(&self, config: &Config) -> ExportOptions {
        let output = self
            .path
            .clone()
            .unwrap_or_else(|| config.export_path.clone());
        let filter =
            LocaleFilter::from_options(self.all, self.locales.as_deref(), &config.default_locale);
        let format = if self.json {
            FormatType::Json
        } else {
            FormatType::Php
        };
        ExportOptions::new(&config.lang_path, output)
            .with_filter(filter)
            .with_formats(vec![format])
    }
}

pub fn run_export(config: &Config, command: &ExportCommand) -> ExitStatus {
    let options = command.options(config);
    match export(&options) {
        Ok(report) => {
            if !report.warnings.is_empty() {
                eprintln!(
                    "⚠️  Skipped {} file(s) that could not be loaded",
                    report.warnings.len()
                );
            }
            println!(
                "✅ Exported {} rows to {}",
                report.rows,
                report.output.display()
            );
            ExitStatus::Success
        }
        Err(e) => {
            eprintln!("❌ Export failed: {}", e);
            ExitStatus::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_config() {
        let config = Config::default();
        let options = ExportCommand::default().options(&config);
        assert_eq!(options.output, config.export_path);
        assert_eq!(options.lang_path, config.lang_path);
        assert_eq!(options.filter, LocaleFilter::Only(vec!["en".to_string()]));
        assert_eq!(options.formats, vec![FormatType::Php]);
    }

    #[test]
    fn test_flags_override_config() {
        let command = ExportCommand {
            path: Some(PathBuf::from("out.csv")),
            locales: Some("fr,es".to_string()),
            all: false,
            json: true,
        };
        let options = command.options(&Config::default());
        assert_eq!(options.output, PathBuf::from("out.csv"));
        assert_eq!(
            options.filter,
            LocaleFilter::Only(vec!["fr".to_string(), "es".to_string()])
        );
        assert_eq!(options.formats, vec![FormatType::Json]);
    }

    #[test]
    fn test_all_selects_every_locale() {
        let command = ExportCommand {
            all: true,
            ..ExportCommand::default()
        };
        assert_eq!(command.options(&Config::default()).filter, LocaleFilter::All);
    }
}
