//! Distributed workers with a local thread pool each

use std::thread;

use tracing::{debug, info, instrument};

use super::collective::{Block, ChannelCollective, Collective};
use super::partition::block_range;
use super::{assemble, check_constructible, fill_rows, Forest, NO_PARENT};
use crate::network::BubbleSortNetwork;
use crate::rule::ParentRule;
use crate::util::try_filled;
use crate::IstError;

/// Build this worker's block, then merge all blocks through `collective`.
///
/// The block is split into at most `thread_count` contiguous chunks of rows,
/// one scoped thread per chunk. If the block cannot be built, the worker
/// aborts the collective before returning its error, so no peer completes
/// the merge.
#[instrument(
    level = "debug",
    skip(network, collective),
    fields(worker = collective.worker_id(), workers = collective.worker_count())
)]
pub fn construct_distributed<C: Collective + ?Sized>(
    network: &BubbleSortNetwork,
    collective: &C,
    thread_count: usize,
    rule: ParentRule,
) -> Result<Forest, IstError> {
    let block = check_constructible(network)
        .and_then(|()| build_block(network, collective, thread_count, rule));
    let block = match block {
        Ok(block) => block,
        Err(err) => {
            collective.abort();
            return Err(err);
        }
    };

    debug!(start = block.start, rows = block.rows.len(), "block ready");
    let blocks = collective.all_gather(block)?;
    assemble(network.dimension(), network.vertex_count(), &blocks)
}

fn build_block<C: Collective + ?Sized>(
    network: &BubbleSortNetwork,
    collective: &C,
    thread_count: usize,
    rule: ParentRule,
) -> Result<Block, IstError> {
    if thread_count == 0 {
        return Err(IstError::InvalidWorkerCount(
            "at least one thread per worker is required".to_string(),
        ));
    }

    let worker = collective.worker_id();
    let range = block_range(network.vertex_count(), collective.worker_count(), worker)?;
    let dimension = network.dimension();
    let trees = dimension - 1;

    let mut rows = try_filled(range.len() * trees, NO_PARENT, "block rows")?;
    fill_rows_threaded(&mut rows, range.start, dimension, rule, thread_count)?;

    Ok(Block {
        worker,
        start: range.start,
        rows,
    })
}

/// Split rows into contiguous chunks and fill each on its own scoped thread.
fn fill_rows_threaded(
    rows: &mut [u32],
    first: usize,
    dimension: usize,
    rule: ParentRule,
    thread_count: usize,
) -> Result<(), IstError> {
    let trees = dimension - 1;
    let vertices = rows.len() / trees;
    if thread_count == 1 || vertices < 2 {
        return fill_rows(rows, first, dimension, rule);
    }

    let per_thread = vertices.div_ceil(thread_count);
    thread::scope(|scope| {
        let handles: Vec<_> = rows
            .chunks_mut(per_thread * trees)
            .enumerate()
            .map(|(chunk, slice)| {
                let start = first + chunk * per_thread;
                scope.spawn(move || fill_rows(slice, start, dimension, rule))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Result<(), IstError>>()
    })
}

/// Run `workers` distributed workers as scoped threads joined by a
/// [`ChannelCollective`], each with `threads` local threads.
///
/// Every worker ends up with the same merged forest. When workers fail, the
/// root cause is reported in preference to the aborts it triggered in peers.
#[instrument(level = "debug", skip(network), fields(dimension = network.dimension()))]
pub fn construct_hybrid(
    network: &BubbleSortNetwork,
    workers: usize,
    threads: usize,
    rule: ParentRule,
) -> Result<Forest, IstError> {
    let endpoints = ChannelCollective::group(workers)?;

    let results: Vec<Result<Forest, IstError>> = thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| {
                scope.spawn(move || construct_distributed(network, &endpoint, threads, rule))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut forests = Vec::with_capacity(results.len());
    let mut aborted = None;
    for result in results {
        match result {
            Ok(forest) => forests.push(forest),
            Err(err @ IstError::WorkerAborted { .. }) => {
                aborted.get_or_insert(err);
            }
            Err(err) => return Err(err),
        }
    }
    if let Some(err) = aborted {
        return Err(err);
    }

    let mut forests = forests.into_iter();
    let merged = forests.next().ok_or_else(|| {
        IstError::InvalidWorkerCount("at least one worker is required".to_string())
    })?;
    for (worker, forest) in forests.enumerate() {
        if forest != merged {
            return Err(IstError::MergeMismatch { worker: worker + 1 });
        }
    }

    info!(workers, threads, "hybrid construction merged");
    Ok(merged)
}
