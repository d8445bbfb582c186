use ndarray::{Array2, ArrayView1};
use serde::Serialize;

use crate::error::{NilHmmError, Result};
use crate::model::{MISSING, N_SYMBOLS};

pub const DEFAULT_EXPECTED_MAF: f64 = 0.0156;
const MIN_ESTIMATED_NIR: f64 = 0.001;

/// Samples x markers genotype calls: 0 = recurrent homozygote, 1 = het,
/// 2 = donor homozygote, 3 = missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationMatrix(Array2<u8>);

impl ObservationMatrix {
    pub fn new(calls: Array2<u8>) -> Result<Self> {
        for ((sample, marker), &value) in calls.indexed_iter() {
            if value as usize >= N_SYMBOLS {
                return Err(NilHmmError::InvalidObservation {
                    sample,
                    marker,
                    value,
                });
            }
        }
        Ok(Self(calls))
    }

    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let n_markers = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * n_markers);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_markers {
                return Err(NilHmmError::ShapeMismatch(format!(
                    "row {} has {} markers, expected {}",
                    i,
                    row.len(),
                    n_markers
                )));
            }
            data.extend_from_slice(row);
        }
        let calls = Array2::from_shape_vec((rows.len(), n_markers), data)
            .map_err(|e| NilHmmError::ShapeMismatch(e.to_string()))?;
        Self::new(calls)
    }

    pub fn n_samples(&self) -> usize {
        self.0.nrows()
    }

    pub fn n_markers(&self) -> usize {
        self.0.ncols()
    }

    pub fn row(&self, sample: usize) -> ArrayView1<'_, u8> {
        self.0.row(sample)
    }

    pub fn as_array(&self) -> &Array2<u8> {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataProfile {
    pub missing_rate: f64,
    pub observed_maf: f64,
    pub expected_maf: f64,
    pub estimated_nir: f64,
}

impl DataProfile {
    /// Missing rate, mean observed donor-allele frequency over called sites,
    /// and the non-informative rate implied by the shortfall against
    /// `expected_maf`.
    pub fn estimate(obs: &ObservationMatrix, expected_maf: f64) -> Result<Self> {
        if !expected_maf.is_finite() || expected_maf <= 0.0 || expected_maf > 1.0 {
            return Err(NilHmmError::InvalidParameter {
                name: "expected_maf",
                value: expected_maf,
                reason: "must be in (0, 1]".to_string(),
            });
        }

        let calls = obs.as_array();
        let total = calls.len();
        let n_missing = calls.iter().filter(|&&v| v == MISSING).count();
        let missing_rate = if total == 0 {
            0.0
        } else {
            n_missing as f64 / total as f64
        };

        let mut maf_sum = 0.0;
        let mut n_called_markers = 0usize;
        for column in calls.columns() {
            let mut dosage = 0usize;
            let mut called = 0usize;
            for &v in column {
                if v != MISSING {
                    dosage += v as usize;
                    called += 1;
                }
            }
            if called > 0 {
                maf_sum += 0.5 * dosage as f64 / called as f64;
                n_called_markers += 1;
            }
        }
        let observed_maf = if n_called_markers == 0 {
            0.0
        } else {
            maf_sum / n_called_markers as f64
        };

        let estimated_nir = ((expected_maf - observed_maf) / expected_maf).max(MIN_ESTIMATED_NIR);
        log::debug!(
            "data profile: missing_rate={missing_rate:.4} observed_maf={observed_maf:.5} estimated_nir={estimated_nir:.4}"
        );
        Ok(Self {
            missing_rate,
            observed_maf,
            expected_maf,
            estimated_nir,
        })
    }
}
