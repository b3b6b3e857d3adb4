//! Output formatting for search results

use crate::server::protocol::SearchResponse;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Results for one pattern, as printed by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport<'a> {
    pub pattern: &'a str,
    /// Where the search ran: `"server"` or `"local"`
    pub source: &'static str,
    #[serde(flatten)]
    pub response: &'a SearchResponse,
}

/// Print results in human-readable form
pub fn print_search_results(reports: &[PatternReport<'_>], choice: ColorChoice) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice);
    write_search_results(&mut stdout, reports)
}

/// Write results in human-readable form to any colour-capable writer
pub fn write_search_results<W: WriteColor>(out: &mut W, reports: &[PatternReport<'_>]) -> io::Result<()> {
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        write_header(out, report)?;

        for m in &report.response.matches {
            // Position
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "{}", m.position)?;
            out.reset()?;
            write!(out, ":")?;

            write!(out, "{}", m.context_before)?;

            // The match itself (highlighted)
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "{}", report.pattern)?;
            out.reset()?;

            writeln!(out, "{}", m.context_after)?;
        }
    }

    Ok(())
}

fn write_header<W: WriteColor>(out: &mut W, report: &PatternReport<'_>) -> io::Result<()> {
    let response = report.response;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    write!(out, "{}", report.pattern)?;
    out.reset()?;

    let noun = if response.total_matches == 1 { "match" } else { "matches" };
    writeln!(
        out,
        ": {} {} ({:.3} ms, {}, {})",
        response.total_matches, noun, response.elapsed_time_ms, response.algorithm_used, report.source
    )
}

/// Print results as pretty JSON (an array, one object per pattern)
pub fn print_json(reports: &[PatternReport<'_>]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, reports)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(lock)
}

/// Print only the match count per pattern (for -c flag)
pub fn print_match_counts(reports: &[PatternReport<'_>], choice: ColorChoice) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice);

    for report in reports {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(stdout, "{}", report.pattern)?;
        stdout.reset()?;
        write!(stdout, ":")?;
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(stdout, "{}", report.response.total_matches)?;
        stdout.reset()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Match;
    use termcolor::NoColor;

    fn response() -> SearchResponse {
        SearchResponse {
            matches: vec![
                Match {
                    position: 1,
                    context_before: "A".to_string(),
                    context_after: "ATCG".to_string(),
                },
                Match {
                    position: 5,
                    context_before: "ATCGA".to_string(),
                    context_after: String::new(),
                },
            ],
            total_matches: 2,
            elapsed_time_ms: 0.5,
            algorithm_used: "KMP".to_string(),
        }
    }

    #[test]
    fn test_plain_output() {
        let response = response();
        let reports = [PatternReport {
            pattern: "TCG",
            source: "local",
            response: &response,
        }];

        let mut out = NoColor::new(Vec::new());
        write_search_results(&mut out, &reports).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();

        assert_eq!(
            text,
            "TCG: 2 matches (0.500 ms, KMP, local)\n1:ATCGATCG\n5:ATCGATCG\n"
        );
    }

    #[test]
    fn test_json_report_is_flat() {
        let response = response();
        let report = PatternReport {
            pattern: "TCG",
            source: "server",
            response: &response,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pattern"], "TCG");
        assert_eq!(value["source"], "server");
        assert_eq!(value["total_matches"], 2);
        assert_eq!(value["algorithm_used"], "KMP");
        assert_eq!(value["matches"][1]["position"], 5);
    }
}
