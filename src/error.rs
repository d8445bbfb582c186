use thiserror::Error;

pub type Result<T> = std::result::Result<T, NilHmmError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NilHmmError {
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },

    #[error("degenerate model: transitions out of state {state} have zero total frequency")]
    DegenerateModel { state: usize },

    #[error("emission row for state {state} sums to {sum}, expected 1")]
    InvalidEmissionRow { state: usize, sum: f64 },

    #[error(
        "unsorted markers on chromosome {chrom}: position {position} follows {previous}"
    )]
    UnsortedMarker {
        chrom: String,
        previous: u64,
        position: u64,
    },

    #[error("invalid observation {value} at sample {sample}, marker {marker}")]
    InvalidObservation {
        sample: usize,
        marker: usize,
        value: u8,
    },

    #[error("invalid observation symbol {value} at position {position}")]
    InvalidSymbol { position: usize, value: u8 },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}
