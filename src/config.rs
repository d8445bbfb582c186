use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::params::{Coverage, ParameterOverrides, ParameterSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
    #[serde(flatten)]
    pub overrides: ParameterOverrides,
}

impl ParamsFile {
    pub fn resolve(&self) -> crate::error::Result<ParameterSet> {
        let base = match self.coverage {
            Some(c) => ParameterSet::preset(c),
            None => ParameterSet::default(),
        };
        base.with_overrides(&self.overrides)
    }
}

impl From<&ParameterSet> for ParamsFile {
    fn from(p: &ParameterSet) -> Self {
        Self {
            coverage: None,
            overrides: ParameterOverrides {
                nir: Some(p.nir()),
                germ: Some(p.germ()),
                gert: Some(p.gert()),
                p: Some(p.p()),
                mr: Some(p.mr()),
                r: Some(p.r()),
                f1: Some(p.f1()),
                f2: Some(p.f2()),
            },
        }
    }
}

pub fn save_params(path: &Path, params: &ParameterSet) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &ParamsFile::from(params))
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

pub fn load_params_file(path: &Path) -> Result<ParamsFile> {
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let reader = BufReader::new(file);
    let params =
        serde_json::from_reader(reader).with_context(|| format!("failed to parse {:?}", path))?;
    Ok(params)
}

pub fn load_params(path: &Path) -> Result<ParameterSet> {
    let file = load_params_file(path)?;
    let params = file
        .resolve()
        .with_context(|| format!("invalid parameters in {:?}", path))?;
    log::info!("loaded parameters from {}: {}", path.display(), params);
    Ok(params)
}
