use ndarray::Array2;
use rayon::prelude::*;

use crate::error::{NilHmmError, Result};
use crate::genotype::ObservationMatrix;
use crate::hmm::{LogModel, viterbi_log};
use crate::model::HmmModel;
use crate::progress;
use crate::segment::{ChromosomeSegment, MarkerIndex, segment_markers};
use crate::summary::{CallMatrix, SummaryRecord, summarize};

#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub threads: Option<usize>,
    pub progress: bool,
}

#[derive(Debug, Clone)]
pub struct DecodeOutput {
    pub calls: CallMatrix,
    pub summaries: Vec<SummaryRecord>,
    pub segments: Vec<ChromosomeSegment>,
}

pub fn decode(
    obs: &ObservationMatrix,
    index: &MarkerIndex,
    model: &HmmModel,
) -> Result<DecodeOutput> {
    decode_with(obs, index, model, &DecodeOptions::default())
}

pub fn decode_with(
    obs: &ObservationMatrix,
    index: &MarkerIndex,
    model: &HmmModel,
    options: &DecodeOptions,
) -> Result<DecodeOutput> {
    if index.len() != obs.n_markers() {
        return Err(NilHmmError::ShapeMismatch(format!(
            "marker index has {} entries but observation matrix has {} columns",
            index.len(),
            obs.n_markers()
        )));
    }
    if options.threads == Some(0) {
        return Err(NilHmmError::ThreadPool(
            "thread count must be >= 1".to_string(),
        ));
    }

    let segments = segment_markers(index)?;
    let lm = LogModel::new(model);
    let n_samples = obs.n_samples();
    log::info!(
        "decoding {} samples x {} markers over {} chromosomes",
        n_samples,
        obs.n_markers(),
        segments.len()
    );

    // (sample, segment) pairs in assembly order
    let pairs: Vec<(usize, usize)> = (0..n_samples)
        .flat_map(|s| (0..segments.len()).map(move |c| (s, c)))
        .collect();
    let pb = progress::maybe_bar(options.progress, pairs.len() as u64, "HMM", "viterbi");

    let run = || -> Vec<Vec<u8>> {
        pairs
            .par_iter()
            .map(|&(sample, seg)| {
                let path = decode_segment(&lm, obs, sample, &segments[seg]);
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                path
            })
            .collect()
    };
    let paths = match options.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| NilHmmError::ThreadPool(e.to_string()))?
            .install(run),
        None => run(),
    };
    if let Some(pb) = pb {
        pb.finish_with_message("viterbi done");
    }

    let mut calls: CallMatrix = Array2::zeros((n_samples, obs.n_markers()));
    for (&(sample, seg), path) in pairs.iter().zip(paths) {
        for (&col, state) in segments[seg].columns.iter().zip(path) {
            calls[(sample, col)] = state;
        }
    }
    let summaries = summarize(&calls);
    log::info!("decoded {} (sample, chromosome) pairs", pairs.len());

    Ok(DecodeOutput {
        calls,
        summaries,
        segments,
    })
}

/// Decodes one sample on one chromosome. State memory starts fresh from the
/// stationary distribution.
pub fn decode_segment(
    lm: &LogModel,
    obs: &ObservationMatrix,
    sample: usize,
    segment: &ChromosomeSegment,
) -> Vec<u8> {
    let row = obs.row(sample);
    viterbi_log(lm, segment.columns.iter().map(|&j| row[j]))
}
