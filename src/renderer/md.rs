use crate::activity::Category;
use crate::engine::HeatmapView;
use crate::months::MonthSpan;
use crate::stats::{Stats, StatsSource};
use crate::timefmt::{format_date, weekday_label, WEEKDAY_LABELS};
use crate::weeks::DAYS_PER_WEEK;
use anyhow::Result;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display columns per week in the text grid
const CELL_WIDTH: usize = 2;
/// Width of the weekday label gutter, including its trailing space
const GUTTER_WIDTH: usize = 4;
/// Glyphs for levels 0..=4; higher levels reuse the last one
const LEVEL_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];

/// Render a heatmap view as a Markdown report
pub fn render(view: &HeatmapView) -> Result<String> {
    let mut output = String::new();

    output.push_str("# 📅 Activity heatmap\n\n");

    // 1. Summary
    render_summary(&mut output, &view.stats, view.stats_source);

    // 2. Grid with month labels
    if view.total_weeks > 0 {
        render_grid(&mut output, view);
    } else {
        output.push_str("*No activity recorded for this period.*\n");
    }

    // 3. Completed items, newest first
    render_completed(&mut output, view);

    Ok(output)
}

fn render_summary(output: &mut String, stats: &Stats, source: StatsSource) {
    output.push_str("### 📊 Summary\n");
    for category in Category::ALL {
        let total = stats.total(category);
        // Goals and lists are the headline counters; the rest only when used
        if total > 0 || matches!(category, Category::Goal | Category::List) {
            output.push_str(&format!(
                "- **{} completed:** {}\n",
                category.label(),
                format_number(total)
            ));
        }
    }
    output.push_str(&format!(
        "- ✅ **Total completed:** {}\n",
        format_number(stats.total_completed)
    ));
    output.push_str(&format!(
        "- 🔥 **Current streak:** {}\n",
        days_phrase(stats.current_streak)
    ));
    output.push_str(&format!(
        "- 🏆 **Longest streak:** {}\n",
        days_phrase(stats.max_streak)
    ));
    output.push_str(&format!(
        "- 📈 **Activity:** {}% ({} of {} days)\n",
        stats.activity_percentage, stats.active_days, stats.total_days
    ));
    output.push_str(&format!(
        "- ☀️ **Active today:** {}\n",
        if stats.is_active_today { "yes" } else { "no" }
    ));

    if source == StatsSource::Server {
        output.push_str("\n*Stats as reported by the server.*\n");
    }
    output.push('\n');
}

fn render_grid(output: &mut String, view: &HeatmapView) {
    output.push_str("### 🗓️ Activity\n");
    output.push_str("```text\n");

    let months = month_label_row(&view.month_spans);
    output.push_str(format!("{}{}", " ".repeat(GUTTER_WIDTH), months).trim_end());
    output.push('\n');

    for slot in 0..DAYS_PER_WEEK {
        let mut row = format!("{:<width$}", WEEKDAY_LABELS[slot], width = GUTTER_WIDTH);
        for week in &view.weeks {
            let cell = match &week.slots[slot] {
                Some(day) => level_glyph(day.level),
                None => ' ',
            };
            row.push(cell);
            row.push_str(&" ".repeat(CELL_WIDTH - 1));
        }
        output.push_str(row.trim_end());
        output.push('\n');
    }

    output.push_str("```\n");

    let legend: Vec<String> = LEVEL_GLYPHS
        .iter()
        .enumerate()
        .map(|(level, glyph)| format!("`{}` {}", glyph, level))
        .collect();
    output.push_str(&format!("Intensity: {} (blank: no record)\n\n", legend.join(" ")));
}

/// Lay month labels out above their first week, cut to the width they span.
///
/// Two months may share a boundary week; a label never overwrites the one
/// before it, so a later label starts right after the previous one instead.
fn month_label_row(spans: &[MonthSpan]) -> String {
    let mut row = String::new();
    let mut column = 0;

    for span in spans {
        let start = span.start_week_index * CELL_WIDTH;
        let end = start + span.week_span * CELL_WIDTH;
        let from = start.max(column);
        if from >= end {
            continue;
        }

        row.push_str(&" ".repeat(from - column));
        let label = truncate_to_width(&span.label, end - from - 1);
        column = from + label.width();
        row.push_str(&label);
    }

    row
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut truncated = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        truncated.push(ch);
    }
    truncated
}

fn render_completed(output: &mut String, view: &HeatmapView) {
    let days: Vec<_> = view
        .days()
        .filter(|d| !d.record.completed.is_empty())
        .collect();
    if days.is_empty() {
        return;
    }

    output.push_str("### 🎉 Completed\n");
    for day in days.iter().rev() {
        let titles: Vec<&str> = day
            .record
            .completed
            .iter()
            .map(|item| item.title.as_str())
            .collect();
        output.push_str(&format!(
            "- **{}** ({}): {}\n",
            format_date(day.record.date()),
            weekday_label(day.record.index.weekday),
            titles.join(", ")
        ));
    }
    output.push('\n');
}

fn level_glyph(level: u8) -> char {
    LEVEL_GLYPHS[(level as usize).min(LEVEL_GLYPHS.len() - 1)]
}

fn days_phrase(days: usize) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped_rev = String::new();

    // Insert commas every three digits, starting from the right
    for (count, ch) in digits.chars().rev().enumerate() {
        if count > 0 && count.is_multiple_of(3) {
            grouped_rev.push(',');
        }
        grouped_rev.push(ch);
    }

    grouped_rev.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start_week_index: usize, week_span: usize, label: &str) -> MonthSpan {
        MonthSpan {
            year: 2024,
            month: 1,
            label: label.to_string(),
            start_week_index,
            week_span,
            width_fraction: 0.0,
            exact_fraction: 0.0,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_month_label_row_positions() {
        let row = month_label_row(&[span(0, 5, "January"), span(4, 4, "February")]);
        // January owns columns 0..10, February starts at its own week (column 8)
        assert_eq!(row, "January Februar");
        let row = month_label_row(&[span(0, 5, "Jan"), span(5, 4, "Feb")]);
        assert_eq!(row, format!("Jan{}Feb", " ".repeat(7)));
    }

    #[test]
    fn test_month_label_row_skips_labels_without_room() {
        let row = month_label_row(&[span(0, 2, "Jan"), span(1, 1, "Feb")]);
        assert_eq!(row, "Jan");
    }

    #[test]
    fn test_truncate_wide_characters() {
        assert_eq!(truncate_to_width("Январь", 3), "Янв");
        assert_eq!(truncate_to_width("一月二月", 5), "一月");
        assert_eq!(truncate_to_width("Mar", 10), "Mar");
    }

    #[test]
    fn test_level_glyph_saturates() {
        assert_eq!(level_glyph(0), '·');
        assert_eq!(level_glyph(4), '█');
        assert_eq!(level_glyph(9), '█');
    }
}
