//! Fetches event logs across wide block ranges in bounded windows.
//!
//! Public providers reject or truncate `eth_getLogs` calls that span too many
//! blocks, so the range is partitioned into consecutive windows and queried
//! one window at a time. Sequential issuance keeps the request rate under
//! provider limits; chunks are never retried, a failed window aborts the
//! whole scan.

use alloy_provider::Provider;
use alloy_rpc_types_eth::{Filter, Log};
use tracing::debug;

use crate::error::Result;

/// Default window width for a single `eth_getLogs` call.
pub const DEFAULT_SCAN_WINDOW: u64 = 5_000;

/// Partition the inclusive range `[from_block, to_block]` into consecutive
/// inclusive windows of at most `window` blocks. Empty when the range is.
#[must_use]
pub fn chunk_ranges(from_block: u64, to_block: u64, window: u64) -> Vec<(u64, u64)> {
    if from_block > to_block {
        return Vec::new();
    }

    let window = window.max(1);
    let mut ranges = Vec::new();
    let mut start = from_block;
    while start <= to_block {
        let end = to_block.min(start.saturating_add(window - 1));
        ranges.push((start, end));
        if end == u64::MAX {
            break;
        }
        start = end + 1;
    }
    ranges
}

/// Fetch all logs matching `filter` from `from_block` through the current
/// chain height, in ascending block order.
///
/// The head is read once up front; logs mined while the scan runs are picked
/// up by the next scan.
pub async fn fetch_logs_chunked<P: Provider>(
    provider: &P,
    filter: &Filter,
    from_block: u64,
    window: u64,
) -> Result<Vec<Log>> {
    let head = provider.get_block_number().await?;
    let ranges = chunk_ranges(from_block, head, window);
    debug!(from_block, head, windows = ranges.len(), "scanning event logs");

    let mut logs = Vec::new();
    for (start, end) in ranges {
        let windowed = filter.clone().from_block(start).to_block(end);
        let chunk = provider.get_logs(&windowed).await?;
        logs.extend(chunk);
    }
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_range_splits_into_bounded_windows() {
        assert_eq!(
            chunk_ranges(0, 12_000, 5_000),
            vec![(0, 4_999), (5_000, 9_999), (10_000, 12_000)],
        );
    }

    #[test]
    fn range_smaller_than_window_is_a_single_query() {
        assert_eq!(chunk_ranges(100, 150, 5_000), vec![(100, 150)]);
    }

    #[test]
    fn exact_multiple_produces_full_windows_only() {
        assert_eq!(
            chunk_ranges(0, 9_999, 5_000),
            vec![(0, 4_999), (5_000, 9_999)],
        );
    }

    #[test]
    fn single_block_range() {
        assert_eq!(chunk_ranges(42, 42, 5_000), vec![(42, 42)]);
    }

    #[test]
    fn inverted_range_yields_no_queries() {
        assert!(chunk_ranges(10, 9, 5_000).is_empty());
    }

    #[test]
    fn windows_are_consecutive_and_cover_the_range() {
        let ranges = chunk_ranges(1, 23_456, 1_000);
        assert_eq!(ranges.first(), Some(&(1, 1_000)));
        assert_eq!(ranges.last().map(|r| r.1), Some(23_456));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0);
        }
    }

    #[test]
    fn zero_window_is_clamped_to_one_block() {
        assert_eq!(chunk_ranges(5, 7, 0), vec![(5, 5), (6, 6), (7, 7)]);
    }
}
