//! Chunked batch processing with per-chunk failure isolation.

use std::future::Future;

use tracing::warn;

use crate::error::Result;

/// Counts produced by processing one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// Top-level items processed (movies, series containers).
    pub processed: u64,
    /// Nested children processed beneath them (episodes).
    pub children: u64,
}

impl ChunkStats {
    pub fn items(processed: u64) -> Self {
        Self { processed, children: 0 }
    }
}

/// Aggregate over all chunks of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub processed: u64,
    pub children: u64,
    pub failed_chunks: usize,
}

/// Partition `items` into ceil(N/C) chunks preserving input order and feed
/// each to `op`, folding the per-chunk stats into one report.
///
/// A chunk error is caught at the chunk boundary: logged, counted as zero
/// contribution, and the remaining chunks still run. Bulk-upsert paths need
/// no pacing between chunks; externally rate-limited paths go through the
/// bounded runner and retry scheduler instead.
pub async fn process_in_chunks<T, F, Fut>(
    items: Vec<T>,
    chunk_size: usize,
    mut op: F,
) -> ChunkReport
where
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Result<ChunkStats>>,
{
    let chunk_size = chunk_size.max(1);
    let total_chunks = items.len().div_ceil(chunk_size);
    let mut report = ChunkReport::default();

    let mut remaining = items;
    let mut index = 0usize;
    while !remaining.is_empty() {
        let tail = if remaining.len() > chunk_size {
            remaining.split_off(chunk_size)
        } else {
            Vec::new()
        };
        let chunk = std::mem::replace(&mut remaining, tail);
        index += 1;

        match op(chunk).await {
            Ok(stats) => {
                report.processed += stats.processed;
                report.children += stats.children;
            }
            Err(error) => {
                warn!(
                    chunk = index,
                    total_chunks,
                    %error,
                    "chunk failed; continuing with remaining chunks"
                );
                report.failed_chunks += 1;
            }
        }
    }

    report
}
