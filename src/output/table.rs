use unicode_width::UnicodeWidthStr;

use crate::about;
use crate::db::models::*;
use crate::preview::{Preview, NO_SELECTION_PROMPT};
use crate::search::grid::GridPage;

/// Bar length for the busiest day in `foiex counts`.
const CHART_WIDTH: usize = 50;

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

/// Left-align `s` in a column of `width` display cells.
fn pad(s: &str, width: usize) -> String {
    let t = truncate(s, width);
    let fill = width.saturating_sub(UnicodeWidthStr::width(t.as_str()));
    format!("{t}{}", " ".repeat(fill))
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// One page of the result grid, headed by the filter explanation.
pub fn render_results(page: &GridPage<'_>, explanation: &str) -> String {
    let mut out = format!("{explanation}\n\n");

    if page.total == 0 {
        out.push_str("0 emails. No emails match.\n\n");
        return out;
    }

    out.push_str(&format!(
        "{} email{} (page {} of {}):\n\n",
        page.total,
        plural(page.total),
        page.page,
        page.page_count
    ));

    out.push_str(&format!(
        "  {:>4} {} {} {} {} {:>5}\n",
        "#",
        pad("SENT", 19),
        pad("SUBJECT", 36),
        pad("FROM", 24),
        pad("TOPIC", 12),
        "PAGES"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(105)));

    for (i, r) in page.rows.iter().enumerate() {
        out.push_str(&format!(
            "  {:>4} {} {} {} {} {:>5}\n",
            page.offset + i,
            pad(&r.sent, 19),
            pad(&r.subject.replace('\n', " "), 36),
            pad(&r.from, 24),
            pad(&r.topic, 12),
            r.pg_cnt,
        ));
    }
    out.push('\n');
    out
}

/// The preview pane for a selected email.
pub fn render_preview(p: &Preview) -> String {
    let mut out = String::from("Email Preview\n");
    out.push_str(&format!("  ID:       {}\n", p.email_id));
    out.push_str(&format!("  Sent:     {}\n", p.sent));
    if !p.subject.is_empty() {
        out.push_str(&format!("  Subject:  {}\n", truncate(&p.subject, 72)));
    }
    out.push_str(&format!(
        "  Email in source document:     {}\n",
        p.source_url_email.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!(
        "  Source document description:  {}\n",
        p.file_description.as_deref().unwrap_or("-")
    ));
    if let Some(ref url) = p.pdf_viewer_url {
        out.push_str(&format!("  PDF viewer:                   {url}\n"));
    }
    out
}

/// Result page followed by the preview, or the selection prompt when no
/// row is selected (empty results included).
pub fn render_search(page: &GridPage<'_>, explanation: &str, selected: Option<&Preview>) -> String {
    let mut out = render_results(page, explanation);
    match selected {
        Some(p) => out.push_str(&render_preview(p)),
        None => out.push_str(&format!("{NO_SELECTION_PROMPT}\n")),
    }
    out
}

/// Print an entity vocabulary, one name per line.
pub fn print_entities(kind: EntityKind, names: &[String]) {
    if names.is_empty() {
        println!("No {} entities.", kind.as_str());
        return;
    }
    println!("{} {} entit{}:\n", names.len(), kind.as_str(), if names.len() == 1 { "y" } else { "ies" });
    for name in names {
        println!("  {name}");
    }
}

/// Horizontal bar chart of emails per day.
pub fn print_daily_counts(counts: &[DailyCount]) {
    if counts.is_empty() {
        println!("No emails in range.");
        return;
    }

    let max = counts.iter().map(|c| c.emails).max().unwrap_or(1).max(1);
    for c in counts {
        let len = (c.emails as usize * CHART_WIDTH).div_ceil(max as usize);
        println!("  {} {:>5} {}", c.date, c.emails, "█".repeat(len));
    }
}

/// Database stats followed by the About block.
pub fn render_stats(stats: &DbStats) -> String {
    let mut out = String::from("Database Statistics:\n");
    out.push_str(&format!("  Emails:       {}\n", stats.emails));
    out.push_str(&format!("  Entities:     {}\n", stats.entities));
    out.push_str(&format!("  Entity links: {}\n", stats.entity_links));
    out.push_str(&format!(
        "  Sent range:   {} .. {}\n",
        stats.first_sent.as_deref().unwrap_or("-"),
        stats.last_sent.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("  DB Size:      {}\n\n", format_bytes(stats.db_size_bytes)));
    out.push_str(&about::about());
    out.push('\n');
    out
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
