use crate::error::{NilHmmError, Result};
use crate::model::{HmmModel, N_STATES, N_SYMBOLS};

#[inline]
fn ln_prob(p: f64) -> f64 {
    if p > 0.0 {
        p.ln()
    } else {
        f64::NEG_INFINITY
    }
}

/// Log-space copy of an [`HmmModel`], computed once per run and shared by
/// every decode call.
#[derive(Debug, Clone)]
pub struct LogModel {
    ln_start: [f64; N_STATES],
    // a_col[to * N_STATES + from]
    ln_a_col: [f64; N_STATES * N_STATES],
    // em_rows[obs][state]
    ln_em_rows: [[f64; N_STATES]; N_SYMBOLS],
}

impl LogModel {
    pub fn new(model: &HmmModel) -> Self {
        let a = model.transition_matrix();
        let em = model.emission_matrix();
        let pi = model.stationary();

        let mut ln_start = [0.0; N_STATES];
        let mut ln_a_col = [0.0; N_STATES * N_STATES];
        let mut ln_em_rows = [[0.0; N_STATES]; N_SYMBOLS];
        for i in 0..N_STATES {
            ln_start[i] = ln_prob(pi.get(i));
            for j in 0..N_STATES {
                ln_a_col[j * N_STATES + i] = ln_prob(a.get(i, j));
            }
            for (obs, row) in ln_em_rows.iter_mut().enumerate() {
                row[i] = ln_prob(em.get(i, obs as u8));
            }
        }
        Self {
            ln_start,
            ln_a_col,
            ln_em_rows,
        }
    }

    #[inline]
    fn emit(&self, obs: u8) -> &[f64; N_STATES] {
        &self.ln_em_rows[obs as usize]
    }
}

#[inline]
fn argmax_lowest(scores: &[f64; N_STATES]) -> usize {
    let mut best = 0usize;
    for k in 1..N_STATES {
        if scores[k] > scores[best] {
            best = k;
        }
    }
    best
}

/// Most probable hidden-state path for one observation sequence.
///
/// Ties between predecessors, and between final states, resolve to the
/// lowest state index.
pub fn viterbi(model: &HmmModel, obs: &[u8]) -> Result<Vec<u8>> {
    if let Some((position, &value)) = obs
        .iter()
        .enumerate()
        .find(|(_, v)| **v as usize >= N_SYMBOLS)
    {
        return Err(NilHmmError::InvalidSymbol { position, value });
    }
    Ok(viterbi_log(&LogModel::new(model), obs.iter().copied()))
}

/// Viterbi over symbols already known to be in `0..4`.
pub fn viterbi_log<I>(lm: &LogModel, obs: I) -> Vec<u8>
where
    I: IntoIterator<Item = u8>,
    I::IntoIter: ExactSizeIterator,
{
    let mut obs = obs.into_iter();
    let n = obs.len();
    let Some(first) = obs.next() else {
        return Vec::new();
    };

    let mut delta = [0.0f64; N_STATES];
    let mut next = [0.0f64; N_STATES];
    let mut back = Vec::<[u8; N_STATES]>::with_capacity(n - 1);

    let em0 = lm.emit(first);
    for k in 0..N_STATES {
        delta[k] = lm.ln_start[k] + em0[k];
    }

    for o in obs {
        let em_obs = lm.emit(o);
        let mut ptr = [0u8; N_STATES];
        for k in 0..N_STATES {
            let a_col_k = &lm.ln_a_col[k * N_STATES..(k + 1) * N_STATES];
            let mut best = delta[0] + a_col_k[0];
            let mut best_i = 0usize;
            for i in 1..N_STATES {
                let v = delta[i] + a_col_k[i];
                if v > best {
                    best = v;
                    best_i = i;
                }
            }
            next[k] = best + em_obs[k];
            ptr[k] = best_i as u8;
        }
        back.push(ptr);
        std::mem::swap(&mut delta, &mut next);
    }

    let mut path = vec![0u8; n];
    let mut state = argmax_lowest(&delta);
    path[n - 1] = state as u8;
    for t in (1..n).rev() {
        state = back[t - 1][state] as usize;
        path[t - 1] = state as u8;
    }
    path
}
