use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{NilHmmError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub chrom: String,
    pub pos: u64,
    pub id: String,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl Marker {
    pub fn new(chrom: impl Into<String>, pos: u64) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            id: ".".to_string(),
            ref_allele: "N".to_string(),
            alt_allele: "N".to_string(),
        }
    }

    pub fn with_alleles(
        mut self,
        id: impl Into<String>,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
    ) -> Self {
        self.id = id.into();
        self.ref_allele = ref_allele.into();
        self.alt_allele = alt_allele.into();
        self
    }

    pub fn label(&self) -> String {
        format!("{}_{}", self.chrom, self.pos)
    }
}

/// Column metadata, one entry per observation-matrix column, sorted by
/// (chromosome, position).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerIndex {
    markers: Vec<Marker>,
}

impl MarkerIndex {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&Marker> {
        self.markers.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }
}

impl FromIterator<Marker> for MarkerIndex {
    fn from_iter<T: IntoIterator<Item = Marker>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeSegment {
    pub chrom: String,
    pub columns: Vec<usize>,
}

impl ChromosomeSegment {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub fn segment_markers(index: &MarkerIndex) -> Result<Vec<ChromosomeSegment>> {
    let mut segments = Vec::<ChromosomeSegment>::new();
    // last position of every chromosome run already closed
    let mut closed: HashMap<&str, u64> = HashMap::new();
    let mut prev: Option<(&str, u64)> = None;

    for (col, marker) in index.iter().enumerate() {
        let chrom = marker.chrom.as_str();
        match prev {
            Some((prev_chrom, prev_pos)) if prev_chrom == chrom => {
                if marker.pos < prev_pos {
                    return Err(NilHmmError::UnsortedMarker {
                        chrom: chrom.to_string(),
                        previous: prev_pos,
                        position: marker.pos,
                    });
                }
                if let Some(seg) = segments.last_mut() {
                    seg.columns.push(col);
                }
            }
            _ => {
                if let Some((prev_chrom, prev_pos)) = prev {
                    closed.insert(prev_chrom, prev_pos);
                }
                if let Some(&last) = closed.get(chrom) {
                    return Err(NilHmmError::UnsortedMarker {
                        chrom: chrom.to_string(),
                        previous: last,
                        position: marker.pos,
                    });
                }
                segments.push(ChromosomeSegment {
                    chrom: chrom.to_string(),
                    columns: vec![col],
                });
            }
        }
        prev = Some((chrom, marker.pos));
    }

    for seg in &segments {
        log::debug!("chromosome {}: {} markers", seg.chrom, seg.len());
    }
    Ok(segments)
}
