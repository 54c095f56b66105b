//! Aggregator service for computing usage statistics
//!
//! Every function re-scans the full record slice and owns its grouping
//! map; input order never affects grouping.

use crate::types::{DailySummary, ModelSummary, TokenComposition, UsageRecord, UsageStats};
use std::collections::HashMap;

/// Top-N window used by the model breakdown display
pub const DEFAULT_TOP_MODELS: usize = 8;

/// Aggregator for computing usage statistics
pub struct Aggregator;

impl Aggregator {
    /// Aggregate records by UTC day (sorted by date ascending)
    pub fn daily(records: &[UsageRecord]) -> Vec<DailySummary> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut daily_map: HashMap<chrono::NaiveDate, DailySummary> = HashMap::new();
        for record in records {
            let date = record.day();
            daily_map
                .entry(date)
                .or_insert_with(|| DailySummary::new(date))
                .add(record);
        }

        let mut result: Vec<DailySummary> = daily_map.into_values().collect();
        result.sort_by_key(|s| s.date);
        result
    }

    /// Aggregate records by exact model name, ranked by cost descending.
    ///
    /// Returns the full ranked set; equal costs are ordered by name.
    pub fn by_model(records: &[UsageRecord]) -> Vec<ModelSummary> {
        let mut model_map: HashMap<&str, ModelSummary> = HashMap::new();
        for record in records {
            model_map
                .entry(record.model.as_str())
                .or_insert_with(|| ModelSummary {
                    model: record.model.clone(),
                    ..Default::default()
                })
                .add(record);
        }

        let mut result: Vec<ModelSummary> = model_map.into_values().collect();
        result.sort_by(|a, b| {
            b.total_cost
                .total_cmp(&a.total_cost)
                .then_with(|| a.model.cmp(&b.model))
        });
        result
    }

    /// Stacked input / cache-read / output series per UTC day (ascending)
    pub fn token_composition(records: &[UsageRecord]) -> Vec<TokenComposition> {
        let mut day_map: HashMap<chrono::NaiveDate, TokenComposition> = HashMap::new();
        for record in records {
            let date = record.day();
            let day = day_map.entry(date).or_insert_with(|| TokenComposition {
                date,
                ..Default::default()
            });
            day.input = day.input.saturating_add(record.input_tokens());
            day.cache_read = day.cache_read.saturating_add(record.cache_read);
            day.output = day.output.saturating_add(record.output_tokens);
        }

        let mut result: Vec<TokenComposition> = day_map.into_values().collect();
        result.sort_by_key(|d| d.date);
        result
    }

    /// Headline totals across all records
    pub fn stats(records: &[UsageRecord]) -> UsageStats {
        UsageStats::from_records(records)
    }
}

/// Presentation-boundary truncation of a ranked model list
pub fn top_models(ranked: &[ModelSummary], n: usize) -> &[ModelSummary] {
    &ranked[..ranked.len().min(n)]
}
