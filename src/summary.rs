use ndarray::Array2;
use serde::Serialize;

use crate::model::N_STATES;

pub type CallMatrix = Array2<u8>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub sample: usize,
    pub total_markers: usize,
    pub counts: [usize; N_STATES],
}

impl SummaryRecord {
    pub fn from_calls<'a, I>(sample: usize, calls: I) -> Self
    where
        I: IntoIterator<Item = &'a u8>,
    {
        let mut counts = [0usize; N_STATES];
        let mut total_markers = 0usize;
        for &c in calls {
            if let Some(slot) = counts.get_mut(c as usize) {
                *slot += 1;
            }
            total_markers += 1;
        }
        Self {
            sample,
            total_markers,
            counts,
        }
    }

    pub fn fraction(&self, state: usize) -> f64 {
        if self.total_markers == 0 {
            0.0
        } else {
            self.counts[state] as f64 / self.total_markers as f64
        }
    }

    pub fn recurrent(&self) -> usize {
        self.counts[0]
    }

    pub fn heterozygous(&self) -> usize {
        self.counts[1]
    }

    pub fn donor(&self) -> usize {
        self.counts[2]
    }
}

pub fn summarize(calls: &CallMatrix) -> Vec<SummaryRecord> {
    calls
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| SummaryRecord::from_calls(i, row))
        .collect()
}

/// Run-level tallies over a whole call matrix. Percentages are in 0..=100,
/// rates in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CallStatistics {
    pub pct_recurrent_calls: f64,
    pub pct_het_calls: f64,
    pub pct_donor_calls: f64,
    pub mean_het_rate: f64,
    pub mean_donor_rate: f64,
    pub std_het_rate: f64,
    pub std_donor_rate: f64,
    pub pct_samples_no_introgression: f64,
}

fn mean_std(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

impl CallStatistics {
    pub fn from_calls(calls: &CallMatrix) -> Self {
        Self::from_summaries(&summarize(calls))
    }

    pub fn from_summaries(records: &[SummaryRecord]) -> Self {
        let mut totals = [0usize; N_STATES];
        let mut n_calls = 0usize;
        let mut no_introgression = 0usize;
        let mut het_rates = Vec::with_capacity(records.len());
        let mut donor_rates = Vec::with_capacity(records.len());
        for rec in records {
            for (t, c) in totals.iter_mut().zip(rec.counts) {
                *t += c;
            }
            n_calls += rec.total_markers;
            if rec.recurrent() == rec.total_markers {
                no_introgression += 1;
            }
            het_rates.push(rec.fraction(1));
            donor_rates.push(rec.fraction(2));
        }

        let pct = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                100.0 * num as f64 / den as f64
            }
        };
        let (mean_het_rate, std_het_rate) = mean_std(&het_rates);
        let (mean_donor_rate, std_donor_rate) = mean_std(&donor_rates);
        Self {
            pct_recurrent_calls: pct(totals[0], n_calls),
            pct_het_calls: pct(totals[1], n_calls),
            pct_donor_calls: pct(totals[2], n_calls),
            mean_het_rate,
            mean_donor_rate,
            std_het_rate,
            std_donor_rate,
            pct_samples_no_introgression: pct(no_introgression, records.len()),
        }
    }
}
