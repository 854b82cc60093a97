use std::fmt::Write;

use crate::app::APP_TITLE;
use crate::supervisor::{Listing, QuitReport};

// http://en.wikipedia.org/wiki/ANSI_escape_code
const ANSI_RED: &str = "\x1b[31m";
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Clear the terminal and home the cursor
pub const CLEAR_SCREEN: &str = "\x1b[1;1H\x1b[2J";

const PATH_COLUMN: &str = "------------------------------------------------------------";

fn bold(text: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

pub fn banner(color: bool) -> String {
    if color {
        format!(
            "{}SCEE{} - {}{}{}\n",
            ANSI_BOLD, ANSI_RESET, ANSI_RED, APP_TITLE, ANSI_RESET
        )
    } else {
        format!("SCEE - {}\n", APP_TITLE)
    }
}

/// Command summary printed before every prompt
pub fn menu(color: bool) -> String {
    let mut out = String::from("\nCOMMANDS\n");
    let entries = [
        ("exec", " <PATH> [arg1] [arg2] ..."),
        ("kill", " <PID>"),
        ("stop", " <PID>"),
        ("cont", " <PID>"),
        ("list", ""),
        ("info", " <PID>"),
        ("quit", ""),
    ];
    for (name, args) in entries {
        let _ = writeln!(out, "    {}{}", bold(name, color), args);
    }
    out
}

/// Render the process table followed by the pruning summary
pub fn listing(listing: &Listing) -> String {
    let separator = format!("+-------+----------+{}", PATH_COLUMN);
    let mut out = String::from("\n");

    let _ = writeln!(out, "+-------------------{}", PATH_COLUMN);
    let _ = writeln!(out, "|  spawned running processes");
    let _ = writeln!(out, "{}", separator);
    let _ = writeln!(out, "|  PID  |  status  |  path  ");
    let _ = writeln!(out, "{}", separator);

    if listing.rows.is_empty() {
        let _ = writeln!(out, "|       |          |        ");
    }
    for row in &listing.rows {
        let _ = writeln!(out, "| {:>5} |  {} | {} ", row.pid, row.status, row.path);
    }

    let _ = writeln!(out, "{}", separator);

    match listing.removed {
        0 => {}
        1 => out.push_str("\n1 obsolete process entry was removed\n\n"),
        n => {
            let _ = write!(out, "\n{} obsolete process entries were removed\n\n", n);
        }
    }

    for failure in &listing.probe_failures {
        let _ = writeln!(out, "error, {}", failure);
    }

    out
}

pub fn quit_summary(report: &QuitReport) -> String {
    let mut out = String::new();
    for pid in &report.terminated {
        let _ = writeln!(out, "the process with PID {} was killed", pid);
    }
    for failure in &report.failures {
        let _ = writeln!(out, "error, {}", failure);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessStatus;
    use crate::supervisor::ListingRow;

    #[test]
    fn test_empty_listing_has_placeholder_and_no_summary() {
        let text = listing(&Listing::default());

        assert!(text.contains("|  PID  |  status  |  path  \n"));
        assert!(text.contains("|       |          |        \n"));
        assert!(!text.contains("obsolete"));
    }

    #[test]
    fn test_rows_are_padded_under_headers() {
        let text = listing(&Listing {
            rows: vec![
                ListingRow {
                    pid: 812,
                    status: ProcessStatus::Running,
                    path: "./integers".to_string(),
                },
                ListingRow {
                    pid: 31044,
                    status: ProcessStatus::Stopped,
                    path: "./times".to_string(),
                },
            ],
            removed: 0,
            probe_failures: Vec::new(),
        });

        assert!(text.contains("|   812 |  running | ./integers \n"));
        assert!(text.contains("| 31044 |  stopped | ./times \n"));
        assert!(!text.contains("|       |          |"));
    }

    #[test]
    fn test_pruning_summary_wording() {
        let one = listing(&Listing {
            removed: 1,
            ..Listing::default()
        });
        assert!(one.contains("1 obsolete process entry was removed"));

        let many = listing(&Listing {
            removed: 3,
            ..Listing::default()
        });
        assert!(many.contains("3 obsolete process entries were removed"));
    }

    #[test]
    fn test_banner_without_color_is_plain() {
        assert_eq!(
            banner(false),
            "SCEE - Signal Controlled Execution Environment\n"
        );
        assert!(banner(true).contains(ANSI_RED));
        assert!(menu(false).contains("    exec <PATH> [arg1] [arg2] ...\n"));
    }
}
