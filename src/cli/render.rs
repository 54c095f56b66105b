//! Plain-text rendering of aggregate views

use std::fmt::Write;

use tokdash::format::{format_compact, format_currency, format_number};
use tokdash::services::CalendarGrid;
use tokdash::types::{DailySummary, ModelSummary, TokenComposition, UsageStats};

const BAR_WIDTH: usize = 20;
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Format a percentage bar with filled/empty blocks
/// Example: 50.0% with width 10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Format a sparkline bar based on value ratio
/// Example: value=500, max=1000, width=8 → "▓▓▓▓░░░░"
pub fn format_sparkline(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || width == 0 {
        return "░".repeat(width);
    }
    let ratio = value / max;
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width); // Clamp to prevent overflow when ratio > 1.0
    let empty = width.saturating_sub(filled);
    format!("{}{}", "▓".repeat(filled), "░".repeat(empty))
}

pub fn summary(stats: &UsageStats) -> String {
    let mut out = String::new();
    let range = match (stats.first, stats.last) {
        (Some(first), Some(last)) => format!(
            "{} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ),
        _ => "-".to_string(),
    };

    let _ = writeln!(
        out,
        "Analyzing {} records from {}",
        format_number(stats.request_count),
        range
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  Total Cost      {}", format_currency(stats.total_cost));
    let _ = writeln!(out, "  Total Tokens    {}", format_compact(stats.total_tokens));
    let _ = writeln!(out, "  Total Requests  {}", format_number(stats.request_count));
    let _ = writeln!(out, "  Unique Models   {}", stats.unique_models);
    let _ = writeln!(out, "  Active Days     {}", stats.active_days);
    let _ = writeln!(out, "  Daily Average   {}", format_currency(stats.daily_avg_cost));
    if let Some((date, cost)) = stats.peak_day {
        let _ = writeln!(out, "  Peak Day        {} ({})", date, format_currency(cost));
    }
    out
}

pub fn daily(days: &[DailySummary]) -> String {
    let mut out = String::new();
    let max_cost = days.iter().map(|d| d.total_cost).fold(0.0, f64::max);

    let _ = writeln!(
        out,
        "{:<10}  {:>10}  {:>8}  {:>8}  {}",
        "Date", "Cost", "Tokens", "Requests", ""
    );
    for day in days {
        let _ = writeln!(
            out,
            "{:<10}  {:>10}  {:>8}  {:>8}  {}",
            day.date,
            format_currency(day.total_cost),
            format_compact(day.total_tokens),
            format_number(day.request_count),
            format_sparkline(day.total_cost, max_cost, BAR_WIDTH)
        );
    }
    out
}

pub fn models(models: &[ModelSummary], total_cost: f64) -> String {
    let mut out = String::new();
    let name_width = models
        .iter()
        .map(|m| m.model.chars().count())
        .max()
        .unwrap_or(0)
        .max("Model".len());

    let _ = writeln!(
        out,
        "{:<name_width$}  {:>10}  {:>8}  {:>6}  {}",
        "Model", "Cost", "Tokens", "Share", ""
    );
    for model in models {
        let percent = if total_cost > 0.0 {
            model.total_cost / total_cost * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>10}  {:>8}  {:>5.1}%  {}",
            model.model,
            format_currency(model.total_cost),
            format_compact(model.total_tokens),
            percent,
            format_percentage_bar(percent, BAR_WIDTH)
        );
    }
    out
}

pub fn heatmap(grid: &CalendarGrid) -> String {
    const LABEL_WIDTH: usize = 4;
    const CELL_WIDTH: usize = 2;

    let mut out = String::new();
    let width = LABEL_WIDTH + grid.weeks.len() * CELL_WIDTH;

    let mut header: Vec<char> = vec![' '; width];
    for month in &grid.months {
        let x = LABEL_WIDTH + month.week_index * CELL_WIDTH;
        for (i, ch) in month.label.chars().enumerate() {
            if let Some(slot) = header.get_mut(x + i) {
                *slot = ch;
            }
        }
    }
    let header: String = header.into_iter().collect();
    let _ = writeln!(out, "{}", header.trim_end());

    for (day_idx, name) in WEEKDAYS.iter().enumerate() {
        let mut row = format!("{:<LABEL_WIDTH$}", name);
        for week in &grid.weeks {
            row.push(week[day_idx].intensity.to_char());
            row.push(' ');
        }
        let _ = writeln!(out, "{}", row.trim_end());
    }

    let _ = writeln!(
        out,
        "\nLess · ░ ▒ ▓ █ More   (max {} / day)",
        format_currency(grid.max_cost)
    );
    out
}

pub fn tokens(days: &[TokenComposition]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>8}  {:>10}  {:>8}",
        "Date", "Input", "Cache Read", "Output"
    );
    for day in days {
        let _ = writeln!(
            out,
            "{:<10}  {:>8}  {:>10}  {:>8}",
            day.date,
            format_compact(day.input),
            format_compact(day.cache_read),
            format_compact(day.output)
        );
    }
    out
}
