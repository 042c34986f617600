//! Classification of questions as "recently published".

use chrono::{DateTime, Duration, Utc};

/// How long after publication a question still counts as recent.
pub fn recency_window() -> Duration {
    Duration::days(1)
}

/// Was something published at `published_at` recent as of `now`?
///
/// True iff the elapsed time lies in `[0, 24h)`: future timestamps are never
/// recent, and exactly one day old is no longer recent.
pub fn was_recently_published(published_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let elapsed = now - published_at;
    elapsed >= Duration::zero() && elapsed < recency_window()
}
