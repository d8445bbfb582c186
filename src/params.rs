use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NilHmmError, Result};

/// Scalar HMM configuration. All terms are probabilities; `f0` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameterSet", into = "RawParameterSet")]
pub struct ParameterSet {
    nir: f64,
    germ: f64,
    gert: f64,
    p: f64,
    mr: f64,
    r: f64,
    f1: f64,
    f2: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawParameterSet {
    nir: f64,
    germ: f64,
    gert: f64,
    p: f64,
    mr: f64,
    r: f64,
    f1: f64,
    f2: f64,
}

impl TryFrom<RawParameterSet> for ParameterSet {
    type Error = NilHmmError;

    fn try_from(raw: RawParameterSet) -> Result<Self> {
        ParameterSet::new(
            raw.nir, raw.germ, raw.gert, raw.p, raw.mr, raw.r, raw.f1, raw.f2,
        )
    }
}

impl From<ParameterSet> for RawParameterSet {
    fn from(p: ParameterSet) -> Self {
        Self {
            nir: p.nir,
            germ: p.germ,
            gert: p.gert,
            p: p.p,
            mr: p.mr,
            r: p.r,
            f1: p.f1,
            f2: p.f2,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(NilHmmError::InvalidParameter {
            name,
            value,
            reason: "must be a probability in [0, 1]".to_string(),
        });
    }
    Ok(())
}

impl ParameterSet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nir: f64,
        germ: f64,
        gert: f64,
        p: f64,
        mr: f64,
        r: f64,
        f1: f64,
        f2: f64,
    ) -> Result<Self> {
        check_probability("nir", nir)?;
        check_probability("germ", germ)?;
        check_probability("gert", gert)?;
        check_probability("p", p)?;
        check_probability("mr", mr)?;
        check_probability("r", r)?;
        check_probability("f1", f1)?;
        check_probability("f2", f2)?;
        if f1 + f2 >= 1.0 {
            return Err(NilHmmError::InvalidParameter {
                name: "f1+f2",
                value: f1 + f2,
                reason: "must be < 1 so that f0 = 1 - f1 - f2 is positive".to_string(),
            });
        }
        Ok(Self {
            nir,
            germ,
            gert,
            p,
            mr,
            r,
            f1,
            f2,
        })
    }

    pub fn preset(coverage: Coverage) -> Self {
        let (nir, germ, gert, mr) = coverage.error_terms();
        Self {
            nir,
            germ,
            gert,
            mr,
            ..Self::default()
        }
    }

    pub fn with_overrides(&self, overrides: &ParameterOverrides) -> Result<Self> {
        Self::new(
            overrides.nir.unwrap_or(self.nir),
            overrides.germ.unwrap_or(self.germ),
            overrides.gert.unwrap_or(self.gert),
            overrides.p.unwrap_or(self.p),
            overrides.mr.unwrap_or(self.mr),
            overrides.r.unwrap_or(self.r),
            overrides.f1.unwrap_or(self.f1),
            overrides.f2.unwrap_or(self.f2),
        )
    }

    pub fn nir(&self) -> f64 {
        self.nir
    }

    pub fn germ(&self) -> f64 {
        self.germ
    }

    pub fn gert(&self) -> f64 {
        self.gert
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn mr(&self) -> f64 {
        self.mr
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn f1(&self) -> f64 {
        self.f1
    }

    pub fn f2(&self) -> f64 {
        self.f2
    }

    pub fn f0(&self) -> f64 {
        1.0 - self.f1 - self.f2
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            nir: 0.01,
            germ: 0.05,
            gert: 0.10,
            p: 0.5,
            mr: 0.15,
            r: 0.01,
            f1: 0.25,
            f2: 0.05,
        }
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nir={} germ={} gert={} p={} mr={} r={} f1={} f2={}",
            self.nir, self.germ, self.gert, self.p, self.mr, self.r, self.f1, self.f2
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    Low,
    Medium,
    High,
}

impl Coverage {
    // (nir, germ, gert, mr)
    fn error_terms(self) -> (f64, f64, f64, f64) {
        match self {
            Coverage::Low => (0.02, 0.08, 0.15, 0.20),
            Coverage::Medium => (0.01, 0.05, 0.10, 0.10),
            Coverage::High => (0.005, 0.02, 0.05, 0.05),
        }
    }
}

impl FromStr for Coverage {
    type Err = NilHmmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Coverage::Low),
            "medium" => Ok(Coverage::Medium),
            "high" => Ok(Coverage::High),
            other => Err(NilHmmError::InvalidParameter {
                name: "coverage",
                value: f64::NAN,
                reason: format!("unknown coverage level '{other}' (expected low, medium or high)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub germ: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gert: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f2: Option<f64>,
}

/// Mean per-interval recombination probability for `n_markers` evenly spread
/// over a genetic map of `map_length_cm` after `generations` meioses.
pub fn recombination_rate(n_markers: usize, map_length_cm: f64, generations: u32) -> Result<f64> {
    if n_markers == 0 {
        return Err(NilHmmError::InvalidParameter {
            name: "n_markers",
            value: 0.0,
            reason: "need at least one marker".to_string(),
        });
    }
    if !map_length_cm.is_finite() || map_length_cm < 0.0 {
        return Err(NilHmmError::InvalidParameter {
            name: "map_length_cm",
            value: map_length_cm,
            reason: "must be a non-negative length".to_string(),
        });
    }
    let r = generations as f64 * map_length_cm / (100.0 * n_markers as f64);
    check_probability("r", r)?;
    Ok(r)
}
