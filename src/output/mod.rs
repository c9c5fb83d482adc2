//! Output module for sitemapper
//!
//! This module renders a finished [`Site`] for people and tools:
//! - Plain text, one block of links and assets per page
//! - Markdown, with a statistics header
//! - JSON, the serialized [`Site`]

mod markdown;
mod text;

pub use markdown::format_markdown_report;
pub use text::format_text_report;

use crate::sitemap::Site;
use crate::OutputError;
use clap::ValueEnum;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

/// Renders a site in the given format
pub fn render_report(site: &Site, format: ReportFormat) -> OutputResult<String> {
    match format {
        ReportFormat::Text => Ok(format_text_report(site)),
        ReportFormat::Markdown => Ok(format_markdown_report(site, chrono::Utc::now())),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(site)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Renders a site and writes it to `output`, or to stdout when no path is given
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(OutputError)` - Rendering or writing failed
pub fn write_report(site: &Site, format: ReportFormat, output: Option<&Path>) -> OutputResult<()> {
    let report = render_report(site, format)?;

    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(report.as_bytes())?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(report.as_bytes())?;
            handle.flush()?;
        }
    }

    Ok(())
}
