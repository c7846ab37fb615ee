//! The ingestion pass.
//!
//! One dispatcher task paginates the pull-request listing and classifies each
//! item against the reporting window. Qualifying pull requests are then
//! processed by concurrently driven units, bounded by the configured
//! concurrency: each unit fetches the first comment, computes the latencies,
//! and writes one record to the sink. The pass returns only after every unit
//! has completed and the sink is flushed.

use futures::stream::{self, TryStreamExt};

use crate::error::PipelineError;
use crate::github::{self, PrSummary};
use crate::metrics;
use crate::record::MetricRecord;
use crate::window::Window;
use crate::AppContext;

/// Counters reported once a pass completes.
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    /// Listing pages fetched.
    pub pages: u32,
    /// Records written to the sink.
    pub emitted: usize,
}

pub async fn run(ctx: &AppContext) -> Result<RunStats, PipelineError> {
    let (summaries, pages) = list_window(ctx).await?;
    tracing::info!(
        pulls = summaries.len(),
        pages,
        "listing complete, computing metrics"
    );

    let emitted = summaries.len();
    stream::iter(summaries.into_iter().map(Ok::<_, PipelineError>))
        .try_for_each_concurrent(Some(ctx.config.fetch_concurrency), |pr| process_one(ctx, pr))
        .await?;

    ctx.sink.close().await?;

    Ok(RunStats { pages, emitted })
}

/// Walks the newest-first listing and collects the pull requests that fall
/// inside the reporting window.
async fn list_window(ctx: &AppContext) -> Result<(Vec<PrSummary>, u32), PipelineError> {
    let mut summaries = Vec::new();
    let mut pages = 0u32;

    let mut page = ctx.github.first_page().await?;

    loop {
        pages += 1;

        let (mut qualifying, crossed) = classify_page(
            page.items.iter().filter_map(github::summarize),
            &ctx.window,
        );
        summaries.append(&mut qualifying);

        if crossed {
            tracing::debug!(pages, "listing crossed below the window, stopping");
            break;
        }

        if pages >= ctx.config.max_api_pages {
            tracing::warn!(
                max_api_pages = ctx.config.max_api_pages,
                repo = %ctx.repo,
                "page cap reached before the window's lower bound, results may be incomplete"
            );
            break;
        }

        match ctx.github.next_page(&page).await? {
            Some(next) => page = next,
            None => break,
        }
    }

    Ok((summaries, pages))
}

/// Splits one listing page into qualifying summaries and reports whether the
/// scan crossed below the window's lower bound. Items are newest-first, so
/// crossing means no later item or page can qualify.
fn classify_page<I>(items: I, window: &Window) -> (Vec<PrSummary>, bool)
where
    I: IntoIterator<Item = PrSummary>,
{
    let mut qualifying = Vec::new();

    for summary in items {
        if window.too_recent(summary.created_at) {
            continue;
        }
        if window.crossed(summary.created_at) {
            return (qualifying, true);
        }
        qualifying.push(summary);
    }

    (qualifying, false)
}

/// One unit of work: first comment, latencies, record, sink.
async fn process_one(ctx: &AppContext, pr: PrSummary) -> Result<(), PipelineError> {
    let first_comment_at = ctx.github.first_comment_at(pr.number).await?;

    let durations = metrics::compute_durations(
        pr.created_at,
        first_comment_at,
        pr.closed_at,
        pr.merged_at,
        ctx.window.end,
        ctx.now,
    );

    let record = MetricRecord::new(&pr, durations);
    ctx.sink.write(&record).await?;

    tracing::debug!(
        pr = pr.number,
        comment_days = durations.comment_days,
        submit_days = durations.submit_days,
        "record written"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn summary(created_at: DateTime<Utc>) -> PrSummary {
        PrSummary {
            number: 1,
            created_at,
            closed_at: None,
            merged_at: None,
            author: Some("alice".to_string()),
            assignee: None,
            state: "open".to_string(),
        }
    }

    fn window() -> Window {
        Window::parse("2024-06-01", "2024-01-01").unwrap()
    }

    fn march(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_page_inside_window_fully_qualifies() {
        let items = vec![summary(march(20)), summary(march(10)), summary(march(1))];

        let (qualifying, crossed) = classify_page(items, &window());

        assert_eq!(qualifying.len(), 3);
        assert!(!crossed);
    }

    #[test]
    fn test_too_recent_items_are_skipped_without_stopping() {
        let recent = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let items = vec![summary(recent), summary(march(10))];

        let (qualifying, crossed) = classify_page(items, &window());

        assert_eq!(qualifying.len(), 1);
        assert!(!crossed);
    }

    #[test]
    fn test_crossing_item_stops_the_scan_mid_page() {
        let ancient = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
        // Newest-first ordering: anything after the crossing item would be
        // older still, so it must not be reported even if it were in range.
        let items = vec![summary(march(10)), summary(ancient), summary(march(5))];

        let (qualifying, crossed) = classify_page(items, &window());

        assert_eq!(qualifying.len(), 1);
        assert!(crossed);
    }

    #[test]
    fn test_empty_page_neither_qualifies_nor_crosses() {
        let (qualifying, crossed) = classify_page(Vec::new(), &window());

        assert!(qualifying.is_empty());
        assert!(!crossed);
    }
}
