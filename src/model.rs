use ndarray::Array2;

use crate::error::{NilHmmError, Result};
use crate::params::ParameterSet;

pub const N_STATES: usize = 3;
pub const N_SYMBOLS: usize = 4;
pub const MISSING: u8 = 3;
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix(Array2<f64>);

impl TransitionMatrix {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let r = params.r();
        let f = [params.f0(), params.f1(), params.f2()];
        let mut a = Array2::zeros((N_STATES, N_STATES));
        for i in 0..N_STATES {
            // Off-diagonal mass goes to the other two states in proportion
            // to their stationary frequencies.
            let others: f64 = (0..N_STATES).filter(|&j| j != i).map(|j| f[j]).sum();
            if others <= 0.0 {
                return Err(NilHmmError::DegenerateModel { state: i });
            }
            for j in 0..N_STATES {
                a[(i, j)] = if i == j { 1.0 - r } else { r * f[j] / others };
            }
        }
        Ok(Self(a))
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.0[(from, to)]
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmissionMatrix(Array2<f64>);

impl EmissionMatrix {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let nir = params.nir();
        let germ = params.germ();
        let gert = params.gert();
        let p = params.p();
        let mr = params.mr();
        let called = 1.0 - mr;

        let rows = [
            [
                (1.0 - germ) * called,
                p * germ * called,
                (1.0 - p) * germ * called,
                mr,
            ],
            [
                ((1.0 - nir) * 0.5 * gert + nir * (1.0 - germ)) * called,
                ((1.0 - nir) * (1.0 - gert) + nir * germ * p) * called,
                ((1.0 - nir) * 0.5 * gert + nir * germ * (1.0 - p)) * called,
                mr,
            ],
            [
                ((1.0 - nir) * germ * (1.0 - p) + nir * (1.0 - germ)) * called,
                germ * p * called,
                ((1.0 - nir) * (1.0 - germ) + nir * germ * (1.0 - p)) * called,
                mr,
            ],
        ];

        let mut em = Array2::zeros((N_STATES, N_SYMBOLS));
        for (state, row) in rows.iter().enumerate() {
            let sum: f64 = row.iter().sum();
            if !sum.is_finite() || (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(NilHmmError::InvalidEmissionRow { state, sum });
            }
            for (obs, v) in row.iter().enumerate() {
                em[(state, obs)] = *v;
            }
        }
        Ok(Self(em))
    }

    pub fn get(&self, state: usize, obs: u8) -> f64 {
        self.0[(state, obs as usize)]
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationaryDistribution([f64; N_STATES]);

impl StationaryDistribution {
    pub fn from_params(params: &ParameterSet) -> Self {
        Self([params.f0(), params.f1(), params.f2()])
    }

    pub fn get(&self, state: usize) -> f64 {
        self.0[state]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// The fixed three-state introgression model shared by every decode call.
#[derive(Debug, Clone)]
pub struct HmmModel {
    params: ParameterSet,
    transition: TransitionMatrix,
    emission: EmissionMatrix,
    stationary: StationaryDistribution,
}

impl HmmModel {
    pub fn new(params: ParameterSet) -> Result<Self> {
        let transition = TransitionMatrix::from_params(&params)?;
        let emission = EmissionMatrix::from_params(&params)?;
        let stationary = StationaryDistribution::from_params(&params);
        log::debug!("built introgression model: {params}");
        Ok(Self {
            params,
            transition,
            emission,
            stationary,
        })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn transition_matrix(&self) -> &TransitionMatrix {
        &self.transition
    }

    pub fn emission_matrix(&self) -> &EmissionMatrix {
        &self.emission
    }

    pub fn stationary(&self) -> &StationaryDistribution {
        &self.stationary
    }
}

pub fn build_model(params: &ParameterSet) -> Result<HmmModel> {
    HmmModel::new(*params)
}
