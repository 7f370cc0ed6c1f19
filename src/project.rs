use crate::chart::{self, ChartConfig, ComputedChart};
use crate::stats::StatsRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event-statistics project: one event, its counters, and its tags.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub event_name: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub stats: StatsRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(event_name: impl Into<String>, event_date: NaiveDate) -> Self {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            event_name: event_name.into(),
            event_date,
            hashtags: Vec::new(),
            stats: StatsRecord::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_stat(&mut self, field: impl Into<String>, value: f64) {
        self.stats.set(field, value);
        self.updated_at = Utc::now();
    }

    pub fn remove_stat(&mut self, field: &str) -> Option<f64> {
        let removed = self.stats.remove(field);
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Adds a hashtag, normalized to lowercase with any leading `#`
    /// stripped. Returns false for duplicates and empty tags.
    pub fn add_hashtag(&mut self, tag: &str) -> bool {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        if tag.is_empty() || self.hashtags.contains(&tag) {
            return false;
        }
        self.hashtags.push(tag);
        self.updated_at = Utc::now();
        true
    }

    pub fn remove_hashtag(&mut self, tag: &str) -> bool {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        let before = self.hashtags.len();
        self.hashtags.retain(|t| t != &tag);
        let removed = self.hashtags.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Evaluates a chart configuration set against this project's stats.
    pub fn compute_charts(&self, configs: &[ChartConfig]) -> Vec<ComputedChart> {
        chart::compute_all(configs, &self.stats)
    }
}
