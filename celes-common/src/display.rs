use unicode_width::UnicodeWidthStr;

use crate::{ReportItem, Severity};

const ANSII_CLEAR: &str = "\x1b[0m";
const ANSII_COLOR_RED: &str = "\x1b[91m";
const ANSII_COLOR_YELLOW: &str = "\x1b[93m";
const ANSII_COLOR_BLUE: &str = "\x1b[94m";

fn ansii_esc_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => ANSII_COLOR_RED,
        Severity::Warning => ANSII_COLOR_YELLOW,
    }
}

impl ReportItem {
    /// Terminal rendering with the offending source line and a caret under
    /// the column. `lines` are the lines of the parsed text.
    pub fn display<'a>(&'a self, lines: &'a [&'a str]) -> ReportItemDisplay<'a> {
        ReportItemDisplay { item: self, lines }
    }
}

pub struct ReportItemDisplay<'a> {
    item: &'a ReportItem,
    lines: &'a [&'a str],
}

impl std::fmt::Display for ReportItemDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let item = self.item;
        let color = ansii_esc_color(item.severity);
        writeln!(f, "{color}{}{ANSII_CLEAR}: {}", item.severity, item.message)?;
        writeln!(
            f,
            " {ANSII_COLOR_BLUE}-->{ANSII_CLEAR} {}:{}:{}",
            item.file, item.pos.row, item.pos.col
        )?;

        let row = item.pos.row as usize;
        let line = row
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .copied()
            .unwrap_or("")
            .trim_end_matches('\r');
        writeln!(f, "{ANSII_COLOR_BLUE}{row:4} |{ANSII_CLEAR} {line}")?;

        // col is 1-based in code points; caret indent is the display width
        // of everything before it
        let col = (item.pos.col as usize).saturating_sub(1);
        let prefix_end = line
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        let num_spaces = line[..prefix_end].width();
        write!(
            f,
            "     {ANSII_COLOR_BLUE}|{ANSII_CLEAR} {:num_spaces$}{color}^{ANSII_CLEAR}",
            ""
        )
    }
}
