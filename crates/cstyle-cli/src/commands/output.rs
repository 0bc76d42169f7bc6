//! Shared output formatting for check results.

use anyhow::Result;
use cstyle_core::FileReport;

use crate::OutputFormat;

/// Prints results for the machine-readable formats. The text format needs no
/// work here; the engine streams it while checking.
pub fn print(reports: &[FileReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {}
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(reports)?;
            println!("{json}");
        }
        OutputFormat::Compact => {
            for report in reports {
                for d in &report.diagnostics {
                    println!(
                        "{}:{}:{} {} {} {}",
                        d.location.file.display(),
                        d.location.line,
                        d.location.column,
                        d.severity,
                        d.check,
                        d.message,
                    );
                }
            }
        }
    }
    Ok(())
}
