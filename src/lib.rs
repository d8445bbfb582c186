//! Introgression calling for near-isogenic line populations with a fixed
//! three-state hidden Markov model (recurrent homozygote, heterozygote,
//! donor homozygote) decoded per sample and per chromosome.

pub mod config;
pub mod decode;
pub mod error;
pub mod genotype;
pub mod hmm;
pub mod model;
pub mod params;
pub mod progress;
pub mod segment;
pub mod summary;

pub use decode::{DecodeOptions, DecodeOutput, decode, decode_with};
pub use error::{NilHmmError, Result};
pub use genotype::{DataProfile, ObservationMatrix};
pub use hmm::viterbi;
pub use model::{HmmModel, build_model};
pub use params::{Coverage, ParameterOverrides, ParameterSet};
pub use segment::{ChromosomeSegment, Marker, MarkerIndex, segment_markers};
pub use summary::{CallMatrix, CallStatistics, SummaryRecord, summarize};
