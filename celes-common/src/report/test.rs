use pretty_assertions::assert_eq;

use crate::{Pos, Report, Severity};

#[test]
fn build_string_format() {
    let mut report = Report::new();
    report.add("a.toml", Pos::new(1, 5), Severity::Error, "Unexpected text");
    report.add("a.toml", Pos::new(3, 1), Severity::Warning, "something odd");

    assert_eq!(
        report.build_string(),
        "a.toml (1, 5): Unexpected text\na.toml (3, 1): something odd\n"
    );
}

#[test]
fn severity_queries() {
    let mut report = Report::new();
    assert!(!report.has_errors());
    assert!(report.is_empty());

    report.add("f", Pos::START, Severity::Warning, "w");
    assert!(!report.has_errors());

    report.add("f", Pos::new(2, 2), Severity::Error, "e");
    assert!(report.has_errors());
    assert_eq!(report.count(Severity::Error), 1);
    assert_eq!(report.count(Severity::Warning), 1);
    assert_eq!(report.len(), 2);
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[test]
fn display_points_at_column() {
    let mut report = Report::new();
    report.add("f.toml", Pos::new(1, 5), Severity::Error, "Unexpected text");

    let lines = ["x = *"];
    let rendered = strip_ansi(&report.items()[0].display(&lines).to_string());
    assert!(rendered.contains("error: Unexpected text"));
    assert!(rendered.contains("f.toml:1:5"));
    assert!(rendered.contains("x = *"));
    // caret sits under the fifth column
    assert!(rendered.ends_with("|     ^"));
}

#[test]
fn display_tolerates_out_of_range_rows() {
    let mut report = Report::new();
    report.add("f.toml", Pos::new(9, 1), Severity::Error, "Unexpected end of file");

    let lines = ["x = 1"];
    let rendered = strip_ansi(&report.items()[0].display(&lines).to_string());
    assert!(rendered.contains("f.toml:9:1"));
}
