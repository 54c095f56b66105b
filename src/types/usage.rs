//! Usage types for cost and token analytics

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use super::{Result, TokdashError};

/// One parsed, validated row of a usage export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageRecord {
    /// Unique within one parse, derived from the source line position
    pub id: String,
    pub date: DateTime<Utc>,
    pub kind: String,
    pub model: String,
    pub max_mode: bool,
    pub input_cache_write: u64,
    pub input_no_cache_write: u64,
    pub cache_read: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
}

impl UsageRecord {
    /// Calendar day this record buckets into.
    /// All grouping goes through here so days are always UTC days.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Cache-write and non-cache-write input combined
    pub fn input_tokens(&self) -> u64 {
        self.input_cache_write.saturating_add(self.input_no_cache_write)
    }
}

/// Non-empty record collection sorted ascending by date.
///
/// Created once per successful load and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageLog {
    records: Vec<UsageRecord>,
}

impl UsageLog {
    /// Wrap parsed records, sorting them by date.
    /// Fails with `NoValidRecords` when there is nothing to analyze.
    pub fn new(mut records: Vec<UsageRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(TokdashError::NoValidRecords);
        }
        records.sort_by_key(|r| r.date);
        Ok(Self { records })
    }

    /// Earliest record
    pub fn earliest(&self) -> &UsageRecord {
        &self.records[0]
    }

    /// Latest record
    pub fn latest(&self) -> &UsageRecord {
        &self.records[self.records.len() - 1]
    }
}

impl Deref for UsageLog {
    type Target = [UsageRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// Per-day totals (sorted ascending by date when produced by the aggregator)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_cost: f64,
    pub total_tokens: u64,
    pub input_cache_write: u64,
    pub input_no_cache_write: u64,
    pub cache_read: u64,
    pub output_tokens: u64,
    pub request_count: u64,
}

impl DailySummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    pub fn add(&mut self, record: &UsageRecord) {
        self.total_cost += record.cost;
        self.total_tokens = self.total_tokens.saturating_add(record.total_tokens);
        self.input_cache_write = self
            .input_cache_write
            .saturating_add(record.input_cache_write);
        self.input_no_cache_write = self
            .input_no_cache_write
            .saturating_add(record.input_no_cache_write);
        self.cache_read = self.cache_read.saturating_add(record.cache_read);
        self.output_tokens = self.output_tokens.saturating_add(record.output_tokens);
        self.request_count = self.request_count.saturating_add(1);
    }
}

/// Per-model totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelSummary {
    pub model: String,
    pub total_cost: f64,
    pub total_tokens: u64,
    pub request_count: u64,
}

impl ModelSummary {
    pub fn add(&mut self, record: &UsageRecord) {
        self.total_cost += record.cost;
        self.total_tokens = self.total_tokens.saturating_add(record.total_tokens);
        self.request_count = self.request_count.saturating_add(1);
    }
}

/// Stacked token series for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TokenComposition {
    pub date: NaiveDate,
    /// Cache-write + non-cache-write input
    pub input: u64,
    pub cache_read: u64,
    pub output: u64,
}

/// Headline numbers for the whole log
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UsageStats {
    pub total_cost: f64,
    pub total_tokens: u64,
    pub request_count: u64,
    pub unique_models: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub active_days: u32,
    pub daily_avg_cost: f64,
    /// Day with the highest cost (earliest wins ties)
    pub peak_day: Option<(NaiveDate, f64)>,
}

impl UsageStats {
    pub fn from_records(records: &[UsageRecord]) -> Self {
        let mut total_cost: f64 = 0.0;
        let mut total_tokens: u64 = 0;
        let mut models: HashSet<&str> = HashSet::new();
        let mut day_costs: HashMap<NaiveDate, f64> = HashMap::new();
        let mut first: Option<DateTime<Utc>> = None;
        let mut last: Option<DateTime<Utc>> = None;

        for record in records {
            total_cost += record.cost;
            total_tokens = total_tokens.saturating_add(record.total_tokens);
            models.insert(record.model.as_str());
            *day_costs.entry(record.day()).or_insert(0.0) += record.cost;

            if first.is_none_or(|f| record.date < f) {
                first = Some(record.date);
            }
            if last.is_none_or(|l| record.date > l) {
                last = Some(record.date);
            }
        }

        let mut peak_day: Option<(NaiveDate, f64)> = None;
        for (&date, &cost) in &day_costs {
            match peak_day {
                None => peak_day = Some((date, cost)),
                Some((peak_date, peak_cost))
                    if cost > peak_cost || (cost == peak_cost && date < peak_date) =>
                {
                    peak_day = Some((date, cost));
                }
                _ => {}
            }
        }

        let active_days = day_costs.len() as u32;
        let daily_avg_cost = if active_days == 0 {
            0.0
        } else {
            total_cost / active_days as f64
        };

        Self {
            total_cost,
            total_tokens,
            request_count: records.len() as u64,
            unique_models: models.len(),
            first,
            last,
            active_days,
            daily_avg_cost,
            peak_day,
        }
    }
}
