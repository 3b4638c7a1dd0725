//! Contiguous vertex blocks, one per worker

use std::ops::Range;

use crate::IstError;

/// Vertex range owned by `worker_id`.
///
/// With `q = vertex_count / worker_count` and `r = vertex_count % worker_count`,
/// the lowest `r` workers own `q + 1` vertices and the rest own `q`, so no
/// block exceeds `ceil(vertex_count / worker_count)`.
pub fn block_range(
    vertex_count: usize,
    worker_count: usize,
    worker_id: usize,
) -> Result<Range<usize>, IstError> {
    if worker_count == 0 {
        return Err(IstError::InvalidWorkerCount(
            "at least one worker is required".to_string(),
        ));
    }
    if worker_id >= worker_count {
        return Err(IstError::InvalidWorkerCount(format!(
            "worker id {} outside 0..{}",
            worker_id, worker_count
        )));
    }

    let base = vertex_count / worker_count;
    let remainder = vertex_count % worker_count;
    let start = worker_id * base + worker_id.min(remainder);
    let len = base + usize::from(worker_id < remainder);
    Ok(start..start + len)
}

/// Every worker's block, in worker order.
pub fn block_ranges(vertex_count: usize, worker_count: usize) -> Result<Vec<Range<usize>>, IstError> {
    (0..worker_count.max(1))
        .map(|worker| block_range(vertex_count, worker_count, worker))
        .collect()
}
