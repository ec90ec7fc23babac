//! HTML reporter: standalone soundtrack page
//!
//! Generates a self-contained dark page that can be viewed in any browser:
//! a hero with totals, one card per track run (album art, Spotify embed),
//! and the commits written during that run with their type badges.

use crate::correlate::{ClassifiedCommit, CorrelatedGroup, VibesReport, UNKNOWN_TRACK};
use anyhow::Result;
use chrono::Local;

/// Render report as standalone HTML
pub fn render(report: &VibesReport) -> Result<String> {
    let mut html = String::new();

    html.push_str(&render_head(report));
    html.push_str("<body>\n");
    html.push_str(&render_hero(report));

    html.push_str("<div class=\"container\">\n");
    html.push_str("<h2 class=\"section-title\">The Soundtrack</h2>\n");
    for group in &report.groups {
        html.push_str(&render_track_card(group));
    }
    html.push_str("</div>\n");

    html.push_str(&render_footer());
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

/// Escape free text for embedding in HTML. The correlation engine emits raw
/// text; this is the only place it gets escaped.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_head(report: &VibesReport) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Vibes — Commit Soundtrack</title>
    <meta name="description" content="Every commit has a vibe. {} commits, {} tracks.">
    <style>
{CSS}
    </style>
</head>
"#,
        report.total_commits, report.total_tracks
    )
}

fn render_hero(report: &VibesReport) -> String {
    format!(
        r#"<div class="hero">
    <h1>every commit has a <span>vibe</span></h1>
    <p class="subtitle">Commits grouped by the song playing when they were written.</p>
    <div class="stats">
        <div class="stat">
            <div class="stat-value">{}</div>
            <div class="stat-label">Commits</div>
        </div>
        <div class="stat">
            <div class="stat-value">{}</div>
            <div class="stat-label">Tracks</div>
        </div>
    </div>
</div>
"#,
        report.total_commits, report.total_tracks
    )
}

fn render_track_card(group: &CorrelatedGroup) -> String {
    let meta = &group.metadata;
    let count = group.commits.len();
    let plural = if count == 1 { "" } else { "s" };

    let art = if meta.image_large.is_empty() {
        String::new()
    } else {
        let large = escape(&meta.image_large);
        let medium = if meta.image_medium.is_empty() {
            large.clone()
        } else {
            escape(&meta.image_medium)
        };
        format!(
            r#"<div class="track-hero-bg" style="background-image: url('{large}')"></div><img class="track-art" src="{medium}" alt="{}" loading="lazy">"#,
            escape(&meta.album)
        )
    };

    // The sentinel has nothing to embed
    let embed = if group.track_id == UNKNOWN_TRACK {
        String::new()
    } else {
        format!(
            r#"    <div class="spotify-embed">
        <iframe
            src="https://open.spotify.com/embed/track/{}?utm_source=generator&amp;theme=0"
            width="100%" height="80"
            frameBorder="0"
            allow="autoplay; clipboard-write; encrypted-media; fullscreen; picture-in-picture"
            loading="lazy">
        </iframe>
    </div>
"#,
            escape(&group.track_id)
        )
    };

    let commits: String = group.commits.iter().map(render_commit).collect();

    format!(
        r#"<div class="track-card type-{}">
    <div class="track-hero">
        {art}
        <div class="track-info">
            <div class="track-name">{}</div>
            <div class="track-artist">{}</div>
            <div class="track-album">{}</div>
        </div>
        <div class="track-badge">{count} commit{plural}</div>
    </div>
{embed}    <div class="commits">
{commits}    </div>
</div>
"#,
        group.dominant_type,
        escape(&meta.name),
        escape(&meta.artist),
        escape(&meta.album),
    )
}

fn render_commit(classified: &ClassifiedCommit) -> String {
    let commit = &classified.commit;
    let type_badge = match classified.commit_type {
        Some(ty) => format!(r#"<span class="commit-type type-{ty}">{ty}</span>"#),
        None => String::new(),
    };
    format!(
        r#"        <div class="commit">
            <code class="commit-hash">{}</code>
            <div class="commit-info">
                <div class="commit-subject">{type_badge}{}</div>
                <div class="commit-meta">{} · {}</div>
            </div>
        </div>
"#,
        escape(&commit.short_hash),
        escape(&commit.subject),
        escape(&commit.author),
        commit.timestamp.format("%b %-d, %Y"),
    )
}

fn render_footer() -> String {
    let generated = Local::now().format("%B %-d, %Y at %-I:%M %p");
    format!(
        r#"<div class="footer">
    Generated {generated} by <strong>vibes</strong>
</div>
"#
    )
}

const CSS: &str = r#"        * { margin: 0; padding: 0; box-sizing: border-box; }

        :root {
            --bg: #0a0a0a;
            --surface: #141414;
            --border: #282828;
            --text: #e1e1e1;
            --text-dim: #6a6a6a;
            --text-muted: #404040;
            --green: #1DB954;
            --green-dim: #1a7a3a;
            --type-feat: #1DB954;
            --type-fix: #e74c3c;
            --type-test: #9b59b6;
            --type-ci: #3498db;
            --type-refactor: #f39c12;
            --type-docs: #1abc9c;
            --type-chore: #95a5a6;
            --type-style: #95a5a6;
            --type-perf: #95a5a6;
        }

        body {
            background: var(--bg);
            color: var(--text);
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', system-ui, sans-serif;
            line-height: 1.6;
            min-height: 100vh;
        }

        .hero {
            text-align: center;
            padding: 80px 20px 60px;
            background: linear-gradient(180deg, #1DB95415 0%, transparent 100%);
        }

        .hero h1 {
            font-size: 3.5rem;
            font-weight: 800;
            letter-spacing: -0.03em;
            margin-bottom: 12px;
        }

        .hero h1 span { color: var(--green); }

        .hero .subtitle {
            color: var(--text-dim);
            font-size: 1.15rem;
            max-width: 520px;
            margin: 0 auto 24px;
        }

        .stats {
            display: flex;
            gap: 32px;
            justify-content: center;
            margin-top: 24px;
        }

        .stat { text-align: center; }

        .stat-value {
            font-size: 2rem;
            font-weight: 700;
            color: var(--green);
        }

        .stat-label {
            font-size: 0.8rem;
            color: var(--text-dim);
            text-transform: uppercase;
            letter-spacing: 0.08em;
        }

        .container {
            max-width: 800px;
            margin: 0 auto;
            padding: 0 20px 80px;
        }

        .section-title {
            font-size: 1.3rem;
            font-weight: 700;
            color: #fff;
            margin-bottom: 24px;
            padding-bottom: 12px;
            border-bottom: 1px solid var(--border);
        }

        .track-card {
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 16px;
            margin-bottom: 32px;
            overflow: hidden;
            transition: border-color 0.2s;
        }

        .track-card:hover { border-color: var(--green-dim); }

        .track-hero {
            position: relative;
            padding: 24px;
            display: flex;
            gap: 20px;
            align-items: center;
            overflow: hidden;
        }

        .track-hero-bg {
            position: absolute;
            inset: 0;
            background-size: cover;
            background-position: center;
            filter: blur(40px) brightness(0.3);
            transform: scale(1.5);
        }

        .track-art {
            width: 80px;
            height: 80px;
            border-radius: 8px;
            object-fit: cover;
            position: relative;
            z-index: 1;
            box-shadow: 0 4px 20px rgba(0,0,0,0.5);
        }

        .track-info {
            position: relative;
            z-index: 1;
            flex: 1;
            min-width: 0;
        }

        .track-name {
            font-size: 1.15rem;
            font-weight: 700;
            color: #fff;
            white-space: nowrap;
            overflow: hidden;
            text-overflow: ellipsis;
        }

        .track-artist {
            font-size: 0.9rem;
            color: rgba(255,255,255,0.7);
        }

        .track-album {
            font-size: 0.8rem;
            color: rgba(255,255,255,0.4);
            margin-top: 2px;
        }

        .track-badge {
            position: relative;
            z-index: 1;
            background: rgba(255,255,255,0.1);
            backdrop-filter: blur(10px);
            padding: 6px 14px;
            border-radius: 20px;
            font-size: 0.8rem;
            font-weight: 600;
            color: var(--green);
            white-space: nowrap;
        }

        .spotify-embed {
            padding: 0 24px;
            margin: 0 0 8px;
        }

        .spotify-embed iframe { border-radius: 12px; }

        .commits { padding: 0 24px 24px; }

        .commit {
            display: flex;
            gap: 12px;
            padding: 12px 0;
            border-top: 1px solid var(--border);
            align-items: flex-start;
        }

        .commit:first-child { border-top: none; }

        .commit-hash {
            font-family: 'SF Mono', 'Fira Code', monospace;
            font-size: 0.8rem;
            color: var(--green);
            background: rgba(29, 185, 84, 0.08);
            padding: 2px 8px;
            border-radius: 4px;
            flex-shrink: 0;
        }

        .commit-info {
            flex: 1;
            min-width: 0;
        }

        .commit-subject {
            font-size: 0.9rem;
            color: var(--text);
            word-break: break-word;
        }

        .commit-type {
            display: inline-block;
            font-size: 0.7rem;
            font-weight: 600;
            text-transform: uppercase;
            letter-spacing: 0.05em;
            padding: 1px 6px;
            border-radius: 3px;
            margin-right: 4px;
        }

        .type-feat { background: rgba(29, 185, 84, 0.15); color: var(--type-feat); }
        .type-fix { background: rgba(231, 76, 60, 0.15); color: var(--type-fix); }
        .type-test { background: rgba(155, 89, 182, 0.15); color: var(--type-test); }
        .type-ci { background: rgba(52, 152, 219, 0.15); color: var(--type-ci); }
        .type-refactor { background: rgba(243, 156, 18, 0.15); color: var(--type-refactor); }
        .type-docs { background: rgba(26, 188, 156, 0.15); color: var(--type-docs); }
        .type-chore, .type-style, .type-perf { background: rgba(149, 165, 166, 0.15); color: var(--type-chore); }

        .commit-meta {
            font-size: 0.75rem;
            color: var(--text-dim);
            margin-top: 2px;
        }

        .footer {
            text-align: center;
            padding: 40px 20px;
            color: var(--text-muted);
            font-size: 0.8rem;
            border-top: 1px solid var(--border);
        }

        @media (max-width: 600px) {
            .hero h1 { font-size: 2.2rem; }
            .stats { gap: 20px; }
            .stat-value { font-size: 1.5rem; }
            .track-hero { padding: 16px; }
            .track-art { width: 60px; height: 60px; }
            .spotify-embed, .commits { padding-left: 16px; padding-right: 16px; }
            .track-badge { display: none; }
        }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_html_structure() {
        let html = render(&test_report()).expect("render HTML");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("class=\"track-card"));
        assert!(html.contains("abc1234"));
        assert!(html.contains("class=\"commit-type type-fix\""));
    }

    #[test]
    fn test_free_text_is_escaped() {
        let html = render(&test_report()).expect("render HTML");
        assert!(html.contains("Song &amp; Dance"));
        assert!(html.contains("The &lt;Artists&gt;"));
        assert!(html.contains("Ada &lt;script&gt;"));
        assert!(!html.contains("Ada <script>"));
    }

    #[test]
    fn test_unknown_group_has_no_embed() {
        let html = render(&test_report()).expect("render HTML");
        assert_eq!(html.matches("open.spotify.com/embed/track/").count(), 1);
        assert!(!html.contains("embed/track/unknown"));
    }

    #[test]
    fn test_escape_helper() {
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape("\"quoted\""), "&quot;quoted&quot;");
    }
}
