//! Results aggregation.
//!
//! The database groups vote rows by option; this module merges those counts
//! with the poll's option list and derives percentages.

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::poll::PollOption;
use crate::models::vote::{ChartSeries, OptionResult, OptionVoteCount, PollResults};

/// Integer percentage of `count` in `total`, rounded half up. Zero when `total` is zero.
pub fn percentage(count: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (count * 200 + total) / (total * 2)
}

/// Builds the results payload.
///
/// Every option appears once, in `order_index` order. Options without votes
/// report zero. Counts for ids not in `options` are ignored, so
/// `total_votes` always equals the sum of the reported option counts.
pub fn tally(poll_id: Uuid, options: &[PollOption], counts: &[OptionVoteCount]) -> PollResults {
    let by_option: HashMap<Uuid, i64> = counts
        .iter()
        .map(|c| (c.option_id, c.vote_count))
        .collect();

    let mut ordered: Vec<&PollOption> = options.iter().collect();
    ordered.sort_by_key(|o| o.order_index);

    let counted: Vec<(&PollOption, i64)> = ordered
        .into_iter()
        .map(|o| (o, by_option.get(&o.id).copied().unwrap_or(0).max(0)))
        .collect();

    let total_votes: i64 = counted.iter().map(|(_, n)| n).sum();

    let results: Vec<OptionResult> = counted
        .iter()
        .map(|(o, n)| OptionResult {
            option_id: o.id,
            text: o.text.clone(),
            order_index: o.order_index,
            vote_count: *n,
            percentage: percentage(*n, total_votes),
        })
        .collect();

    let chart = ChartSeries {
        labels: results.iter().map(|r| r.text.clone()).collect(),
        data: results.iter().map(|r| r.vote_count).collect(),
    };

    PollResults {
        poll_id,
        total_votes,
        options: results,
        chart,
    }
}
