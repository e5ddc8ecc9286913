//! Concurrent processing of all documents in one analysis request.

mod aggregator;
mod merge;

pub use aggregator::BatchAggregator;
pub use merge::{FirstCompletedWins, MergeStrategy};
