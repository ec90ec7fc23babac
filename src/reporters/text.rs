//! Text (terminal) reporter with colors and formatting

use crate::correlate::{CommitType, VibesReport, UNKNOWN_TRACK};
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";

/// Commit type colors (ANSI escape codes)
fn type_color(commit_type: CommitType) -> &'static str {
    match commit_type {
        CommitType::Feat => "\x1b[32m",     // Green
        CommitType::Fix => "\x1b[31m",      // Red
        CommitType::Test => "\x1b[35m",     // Magenta
        CommitType::Ci => "\x1b[34m",       // Blue
        CommitType::Refactor => "\x1b[33m", // Yellow
        CommitType::Docs => "\x1b[36m",     // Cyan
        CommitType::Chore | CommitType::Style | CommitType::Perf => "\x1b[90m", // Gray
    }
}

/// Render report as formatted terminal output
pub fn render(report: &VibesReport) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}Commit Soundtrack{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Commits: {BOLD}{}{RESET}  Tracks: {BOLD}{}{RESET}\n\n",
        report.total_commits, report.total_tracks
    ));

    if report.groups.is_empty() {
        out.push_str("No commits found.\n");
        return Ok(out);
    }

    for group in &report.groups {
        let count = group.commits.len();
        let plural = if count == 1 { "commit" } else { "commits" };

        if group.track_id == UNKNOWN_TRACK {
            out.push_str(&format!(
                "{BOLD}(nothing playing){RESET}  {DIM}{count} {plural}{RESET}\n"
            ));
        } else {
            out.push_str(&format!(
                "{BOLD}{}{RESET} {DIM}·{RESET} {}  {DIM}{count} {plural}{RESET}\n",
                group.metadata.name, group.metadata.artist
            ));
            if !group.metadata.album.is_empty() {
                out.push_str(&format!("{DIM}  {}{RESET}\n", group.metadata.album));
            }
        }

        for classified in &group.commits {
            let commit = &classified.commit;
            let tag = match classified.commit_type {
                Some(ty) => format!("{}[{}]{RESET} ", type_color(ty), ty),
                None => String::new(),
            };
            out.push_str(&format!(
                "  {GREEN}{}{RESET}  {tag}{}\n",
                commit.short_hash, commit.subject
            ));
            out.push_str(&format!(
                "  {DIM}         {} · {}{RESET}\n",
                commit.author,
                commit.timestamp.format("%b %-d, %Y")
            ));
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::VibesReport;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_render_contains_tracks_and_commits() {
        let out = render(&test_report()).expect("render text");
        assert!(out.contains("Song & Dance"));
        assert!(out.contains("abc1234"));
        assert!(out.contains("fix: bug"));
        assert!(out.contains("(nothing playing)"));
    }

    #[test]
    fn test_text_render_empty_report() {
        let report = VibesReport {
            total_commits: 0,
            total_tracks: 0,
            groups: Vec::new(),
        };
        let out = render(&report).expect("render text");
        assert!(out.contains("No commits found."));
    }

    #[test]
    fn test_untyped_commit_has_no_tag() {
        let out = render(&test_report()).expect("render text");
        let merge_line = out
            .lines()
            .find(|l| l.contains("Merge branch"))
            .expect("merge line");
        assert!(!merge_line.contains('['));
    }
}
