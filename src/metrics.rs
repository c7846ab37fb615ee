//! Per-pull-request latency calculation.

use chrono::{DateTime, Duration, Utc};

/// Day-count latencies computed for a single pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    /// Days from creation to the first discussion comment.
    pub comment_days: i64,
    /// Days from the first response to resolution.
    pub submit_days: i64,
}

/// Computes response and resolution latencies for one pull request.
///
/// # Arguments
/// * `created_at` - When the pull request was opened.
/// * `first_comment_at` - The earliest discussion comment, if any.
/// * `closed_at` / `merged_at` - Resolution timestamps; closed takes
///   precedence when both are present.
/// * `window_end` - The reporting window's lower bound, the pivot for
///   still-open pull requests whose first comment postdates it.
/// * `now` - The current time, captured once at process start.
pub fn compute_durations(
    created_at: DateTime<Utc>,
    first_comment_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
    window_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Durations {
    let (comment, submit) = match first_comment_at {
        Some(commented_at) => {
            let comment = commented_at - created_at;
            let submit = if let Some(closed_at) = closed_at {
                closed_at - commented_at
            } else if let Some(merged_at) = merged_at {
                merged_at - commented_at
            } else if window_end - commented_at > Duration::zero() {
                now - commented_at
            } else {
                // Historical exports flip the operands when the comment
                // postdates the window's lower bound; the branch is kept
                // as-is so already-closed windows reproduce their output.
                commented_at - window_end
            };
            (comment, submit)
        }
        None => {
            if let Some(closed_at) = closed_at {
                (Duration::zero(), closed_at - created_at)
            } else if let Some(merged_at) = merged_at {
                (Duration::zero(), merged_at - created_at)
            } else {
                // Still awaiting a first response.
                (now - created_at, Duration::zero())
            }
        }
    };

    Durations {
        comment_days: whole_days(comment),
        submit_days: whole_days(submit),
    }
}

// Truncates toward zero, bucketing by whole 24-hour spans.
fn whole_days(duration: Duration) -> i64 {
    duration.num_hours() / 24
}
