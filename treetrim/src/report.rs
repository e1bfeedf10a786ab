use std::io::{self, Write};

use log::warn;
use treetrim_lib::{Counters, Inventory};

/// Everything shown in the statistics block printed after a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub inventory: Inventory,
    pub counters: Counters,
    pub estimated_tokens: usize,
    pub output_bytes: usize,
    pub token_limit: usize,
}

impl Report {
    /// Share of the token limit used, or `None` when no limit is set.
    pub fn limit_percentage(&self) -> Option<f64> {
        if self.token_limit == 0 {
            None
        } else {
            Some(self.estimated_tokens as f64 * 100.0 / self.token_limit as f64)
        }
    }
}

pub fn print_report(report: &Report) -> io::Result<()> {
    if report.token_limit > 0 && report.estimated_tokens > report.token_limit {
        warn!(
            "Estimated {} tokens exceeds the limit of {}",
            report.estimated_tokens, report.token_limit
        );
    }
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    write_report(&mut handle, report)?;
    handle.flush()
}

pub fn write_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let raw = &report.inventory;
    let counters = &report.counters;

    writeln!(out, "--- treetrim statistics ---")?;
    writeln!(out, "Raw inventory:")?;
    writeln!(out, "  folders:          {}", raw.total_folders)?;
    writeln!(out, "  files:            {}", raw.total_files)?;
    writeln!(out, "  images:           {}", raw.image_files)?;
    writeln!(out, "  markdown:         {}", raw.markdown_files)?;
    writeln!(out, "  icon files:       {}", raw.icon_files)?;
    writeln!(out, "Scanned:")?;
    writeln!(out, "  folders:          {}", counters.raw_total_folders)?;
    writeln!(out, "  files:            {}", counters.raw_total_files)?;
    writeln!(out, "  files in output:  {}", counters.filtered_total_files)?;
    writeln!(out, "Ignored:")?;
    writeln!(out, "  hidden:           {}", counters.ignored_hidden)?;
    writeln!(out, "  icons:            {}", counters.ignored_icons)?;
    writeln!(out, "  by type:          {}", counters.ignored_by_type)?;
    writeln!(out, "Detected:")?;
    writeln!(out, "  aliases:          {}", counters.detected_aliases)?;
    writeln!(out, "  repositories:     {}", counters.detected_repos)?;
    writeln!(out, "  repo archives:    {}", counters.detected_repo_archives)?;
    writeln!(out, "Output:")?;
    writeln!(out, "  bytes:            {}", report.output_bytes)?;
    writeln!(out, "  estimated tokens: {}", report.estimated_tokens)?;
    match report.limit_percentage() {
        Some(pct) => writeln!(
            out,
            "  token limit:      {} ({:.1}% used)",
            report.token_limit, pct
        )?,
        None => writeln!(out, "  token limit:      none")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        Report {
            inventory: Inventory {
                total_folders: 4,
                total_files: 12,
                image_files: 3,
                markdown_files: 2,
                icon_files: 1,
            },
            counters: Counters {
                raw_total_folders: 3,
                raw_total_files: 10,
                ignored_hidden: 2,
                filtered_total_files: 7,
                ..Counters::default()
            },
            estimated_tokens: 1500,
            output_bytes: 6000,
            token_limit: 75_000,
        }
    }

    fn render(report: &Report) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, report).expect("writing to a Vec cannot fail");
        String::from_utf8(buf).expect("report is UTF-8")
    }

    #[test]
    fn every_counter_is_listed_even_when_zero() {
        let text = render(&sample());
        assert!(text.contains("  files in output:  7\n"));
        assert!(text.contains("  hidden:           2\n"));
        assert!(text.contains("  icons:            0\n"));
        assert!(text.contains("  repo archives:    0\n"));
        assert!(text.contains("  images:           3\n"));
        assert!(text.contains("  token limit:      75000 (2.0% used)\n"));
    }

    #[test]
    fn zero_limit_reports_no_percentage() {
        let report = Report {
            token_limit: 0,
            ..sample()
        };
        assert_eq!(report.limit_percentage(), None);
        assert!(render(&report).contains("  token limit:      none\n"));
    }
}
