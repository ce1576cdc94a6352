use std::io::{self, Write};

use colored::Colorize;
use log::debug;

use crate::types::{PackageSummary, ReportResult};

/// Human-readable byte count, e.g. `12.3 KiB`.
pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn print_no_dependencies_message<W: Write>(
    writer: &mut W,
    result: &ReportResult,
) -> io::Result<()> {
    debug!("Nothing to report");
    if result.total_count == 0 {
        writeln!(
            writer,
            "{} No top-level dependencies found in {}",
            "✓".green().bold(),
            result.lockfile.display()
        )?;
    } else {
        // Top-level packages that all require one another suppress each other
        writeln!(
            writer,
            "{} All top-level packages in {} are required by a sibling ({} packages in the tree)",
            "✓".green().bold(),
            result.lockfile.display(),
            result.total_count
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn print_report<W: Write>(writer: &mut W, result: &ReportResult) -> io::Result<()> {
    debug!("Printing report for {} packages", result.packages.len());
    let show_sizes = result.total_size.is_some();

    let name_width = result
        .packages
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    writeln!(writer, "{} {}\n", "●".bright_blue(), result.lockfile.display().to_string().bold())?;

    let mut header = format!("{:<name_width$}  {:>7}  {:>7}", "Name", "Count", "Shared");
    if show_sizes {
        header.push_str(&format!("  {:>12}", "Size"));
    }
    writeln!(writer, "{}", header.bold())?;
    writeln!(writer, "{}", "─".repeat(header.chars().count()).dimmed())?;

    for package in &result.packages {
        write_row(writer, package, name_width, show_sizes)?;
    }

    writeln!(writer)?;
    print_summary(writer, result)?;

    writer.flush()?;
    Ok(())
}

fn write_row<W: Write>(
    writer: &mut W,
    package: &PackageSummary,
    name_width: usize,
    show_sizes: bool,
) -> io::Result<()> {
    write!(
        writer,
        "{:<name_width$}  {:>7}  {:>7}",
        package.name,
        package.count.to_string().cyan(),
        package.shared.to_string().yellow()
    )?;
    if show_sizes {
        let size = package.child_size.map(format_bytes).unwrap_or_default();
        write!(writer, "  {:>12}", size.red())?;
    }
    writeln!(writer)
}

fn print_summary<W: Write>(writer: &mut W, result: &ReportResult) -> io::Result<()> {
    writeln!(
        writer,
        "  {} top-level packages reported, {} packages in the tree",
        result.packages.len().to_string().cyan().bold(),
        result.total_count.to_string().cyan().bold()
    )?;

    if let Some(total) = result.total_size {
        writeln!(
            writer,
            "  Total size: {} ({} size requests)",
            format_bytes(total).red().bold(),
            result.probed
        )?;
    }

    Ok(())
}
