use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::DataEncoding;
use crate::codec::DecodeError;

/// A row of the `chromatogram` table, without its data points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromatogramHeader {
    /// Chromatogram id
    pub id: i64,
    /// Unique name (e.g., "TIC")
    pub name: String,
    /// Activation type, empty for TIC/BPC
    pub activation_type: Option<String>,
    /// Precursor XML, SRM only
    pub precursor: Option<String>,
    /// Product XML, SRM only
    pub product: Option<String>,
    /// Shared param tree id
    pub shared_param_tree_id: Option<i64>,
    /// Run id
    pub run_id: i64,
    /// Data processing id
    pub data_processing_id: Option<i64>,
    /// Data encoding of the data points
    pub data_encoding_id: i64,
}

impl ChromatogramHeader {
    pub(crate) const SQL_COLUMNS: &'static str = "id, name, activation_type, precursor, product, \
         shared_param_tree_id, run_id, data_processing_id, data_encoding_id";

    /// Map a row selected with [`SQL_COLUMNS`](Self::SQL_COLUMNS)
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            activation_type: row
                .get::<_, Option<String>>(2)?
                .filter(|a| !a.is_empty()),
            precursor: row.get(3)?,
            product: row.get(4)?,
            shared_param_tree_id: row.get(5)?,
            run_id: row.get(6)?,
            data_processing_id: row.get(7)?,
            data_encoding_id: row.get(8)?,
        })
    }

    /// True for SRM/MRM traces, which carry precursor and product
    pub fn is_srm(&self) -> bool {
        self.precursor.is_some() && self.product.is_some()
    }
}

/// Decoded chromatogram points in SoA layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromatogramData {
    /// Encoding the points were decoded with
    pub data_encoding: DataEncoding,
    /// Retention times
    pub time_list: Vec<f64>,
    /// Intensities
    pub intensity_list: Vec<f32>,
}

impl ChromatogramData {
    /// Build chromatogram data, checking that both arrays have the same length
    pub fn new(
        data_encoding: DataEncoding,
        time_list: Vec<f64>,
        intensity_list: Vec<f32>,
    ) -> Result<Self, DecodeError> {
        if time_list.len() != intensity_list.len() {
            return Err(DecodeError::LengthMismatch {
                array: "intensity",
                expected: time_list.len(),
                actual: intensity_list.len(),
            });
        }
        Ok(Self {
            data_encoding,
            time_list,
            intensity_list,
        })
    }

    /// Number of points
    pub fn points_count(&self) -> usize {
        self.time_list.len()
    }

    /// True when the chromatogram has no point
    pub fn is_empty(&self) -> bool {
        self.time_list.is_empty()
    }

    /// The (time, intensity) point with the highest intensity
    pub fn max_intensity_point(&self) -> Option<(f64, f32)> {
        self.time_list
            .iter()
            .zip(&self.intensity_list)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&t, &i)| (t, i))
    }

    /// Sum of all intensities
    pub fn total_intensity(&self) -> f64 {
        self.intensity_list.iter().map(|&i| i as f64).sum()
    }

    /// Points with `min_time <= time <= max_time`
    pub fn points_in_time_range(&self, min_time: f64, max_time: f64) -> Vec<(f64, f32)> {
        self.time_list
            .iter()
            .zip(&self.intensity_list)
            .filter(|&(&t, _)| t >= min_time && t <= max_time)
            .map(|(&t, &i)| (t, i))
            .collect()
    }
}

/// A chromatogram header together with its points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromatogram {
    /// Header
    pub header: ChromatogramHeader,
    /// Points
    pub data: ChromatogramData,
}
