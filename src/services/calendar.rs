//! Week-aligned calendar grid for the daily cost heatmap

use chrono::{Datelike, Duration, Month, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::types::UsageRecord;

/// Heatmap intensity band relative to the busiest day's cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeatmapIntensity {
    /// No activity (zero cost)
    None,
    /// Below 10% of max
    Low,
    /// Below 40% of max
    Medium,
    /// Below 70% of max
    High,
    /// 70% of max and above
    Max,
}

impl HeatmapIntensity {
    /// Map a day's cost to a band using fixed fractions of `max`
    pub fn from_value(value: f64, max: f64) -> Self {
        if value <= 0.0 || max <= 0.0 {
            return Self::None;
        }
        let ratio = value / max;
        if ratio < 0.1 {
            Self::Low
        } else if ratio < 0.4 {
            Self::Medium
        } else if ratio < 0.7 {
            Self::High
        } else {
            Self::Max
        }
    }

    /// Glyph for text rendering
    pub fn to_char(self) -> char {
        match self {
            Self::None => '·',
            Self::Low => '░',
            Self::Medium => '▒',
            Self::High => '▓',
            Self::Max => '█',
        }
    }
}

/// One day of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub cost: f64,
    pub count: u64,
    pub intensity: HeatmapIntensity,
}

/// Month name placed above the week column where that month starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    pub label: String,
    pub week_index: usize,
}

/// Weeks (Sunday..Saturday) spanning the whole data range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarGrid {
    pub weeks: Vec<[CalendarCell; 7]>,
    pub months: Vec<MonthLabel>,
    /// Highest single-day cost in the data
    pub max_cost: f64,
}

impl CalendarGrid {
    /// Build the grid from records in any order.
    ///
    /// The range runs from the Sunday on or before the earliest record's
    /// UTC day to the Saturday on or after the latest one. Days without
    /// records get zero cost and count.
    pub fn build(records: &[UsageRecord]) -> Self {
        let mut day_map: HashMap<NaiveDate, (f64, u64)> = HashMap::new();
        let mut range: Option<(NaiveDate, NaiveDate)> = None;

        for record in records {
            let date = record.day();
            let day = day_map.entry(date).or_insert((0.0, 0));
            day.0 += record.cost;
            day.1 += 1;

            range = Some(match range {
                None => (date, date),
                Some((start, end)) => (start.min(date), end.max(date)),
            });
        }

        let Some((start, end)) = range else {
            return Self {
                weeks: Vec::new(),
                months: Vec::new(),
                max_cost: 0.0,
            };
        };

        let max_cost = day_map.values().map(|(cost, _)| *cost).fold(0.0, f64::max);
        let grid_start = week_start(start);
        let grid_end = week_end(end);

        let mut weeks = Vec::new();
        let mut months: Vec<MonthLabel> = Vec::new();
        let mut current_month: Option<u32> = None;
        let mut date = grid_start;

        while date <= grid_end {
            let week_index = weeks.len();
            let week: [CalendarCell; 7] = std::array::from_fn(|offset| {
                let day = date + Duration::days(offset as i64);
                let (cost, count) = day_map.get(&day).copied().unwrap_or((0.0, 0));
                CalendarCell {
                    date: day,
                    cost,
                    count,
                    intensity: HeatmapIntensity::from_value(cost, max_cost),
                }
            });

            for cell in &week {
                let month = cell.date.month();
                if current_month != Some(month) && cell.date.day() < 8 {
                    months.push(MonthLabel {
                        label: month_abbrev(month).to_string(),
                        week_index,
                    });
                    current_month = Some(month);
                }
            }

            weeks.push(week);
            date += Duration::weeks(1);
        }

        Self {
            weeks,
            months,
            max_cost,
        }
    }

    /// Every cell, week by week
    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.weeks.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Saturday on or after `date`
pub fn week_end(date: NaiveDate) -> NaiveDate {
    date + Duration::days(6 - date.weekday().num_days_from_sunday() as i64)
}

fn month_abbrev(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| &m.name()[..3])
        .unwrap_or("")
}
