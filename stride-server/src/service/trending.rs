use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::db::StorageAdapter;
use crate::error::{CoreError, CoreResult};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Engagement-recency scoring for the trending feed.
///
/// A post's score is the number of reactions on it plus the number of live
/// comments on it created after `now - days_ago`. The window applies to the
/// engagement, not to when the post itself was published.
#[derive(Clone)]
pub struct TrendingScorer {
    storage: Arc<dyn StorageAdapter>,
}

impl TrendingScorer {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    pub fn score(&self, post_id: &Uuid, days_ago: f64) -> CoreResult<u64> {
        let scores = self.score_batch(&[*post_id], days_ago)?;
        Ok(scores.get(post_id).copied().unwrap_or(0))
    }

    /// Scores for every id in `post_ids`, zero included, from one aggregate query
    pub fn score_batch(&self, post_ids: &[Uuid], days_ago: f64) -> CoreResult<HashMap<Uuid, u64>> {
        let cutoff = cutoff(Utc::now(), days_ago)?;
        self.scores_since(post_ids, cutoff)
    }

    /// Scores counting engagement after an already validated cutoff
    pub fn scores_since(&self, post_ids: &[Uuid], cutoff: DateTime<Utc>) -> CoreResult<HashMap<Uuid, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let engagement = self
            .storage
            .engagement_since(post_ids, cutoff)
            .map_err(CoreError::database)?;

        tracing::debug!(
            "Scored {} trending candidates since {} ({} with engagement)",
            post_ids.len(),
            cutoff,
            engagement.len()
        );

        Ok(post_ids
            .iter()
            .map(|id| (*id, engagement.get(id).copied().unwrap_or(0)))
            .collect())
    }
}

/// Start of the lookback window. `days_ago` may be fractional.
pub fn cutoff(now: DateTime<Utc>, days_ago: f64) -> CoreResult<DateTime<Utc>> {
    if !days_ago.is_finite() || days_ago <= 0.0 {
        return Err(CoreError::input(format!(
            "trending window must be a positive number of days (got {days_ago})"
        )));
    }

    // f64 -> i64 casts saturate, and try_milliseconds rejects the extremes
    let millis = (days_ago * MILLIS_PER_DAY).round() as i64;
    TimeDelta::try_milliseconds(millis)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| CoreError::input(format!("trending window of {days_ago} days is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cutoff_is_fractional_days_back() {
        let now = Utc::now();
        assert_eq!(cutoff(now, 1.0).unwrap(), now - Duration::days(1));
        assert_eq!(cutoff(now, 0.5).unwrap(), now - Duration::hours(12));
    }

    #[test]
    fn test_cutoff_rejects_non_positive_and_non_finite() {
        let now = Utc::now();
        for days in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(cutoff(now, days), Err(CoreError::Input(_))), "{days}");
        }
    }

    #[test]
    fn test_cutoff_rejects_windows_past_the_calendar() {
        assert!(matches!(cutoff(Utc::now(), 1e15), Err(CoreError::Input(_))));
    }
}
