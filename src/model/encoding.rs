use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::DecodeError;

/// Acquisition mode of the peaks stored under an encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Continuous profile data
    Profile,
    /// Centroided peaks
    Centroid,
    /// Fitted peaks carrying left/right half-widths at half-maximum
    Fitted,
}

impl DataMode {
    /// Parse the `data_encoding.mode` column value
    pub fn from_db_value(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "profile" => Some(DataMode::Profile),
            "centroid" => Some(DataMode::Centroid),
            "fitted" => Some(DataMode::Fitted),
            _ => None,
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataMode::Profile => write!(f, "profile"),
            DataMode::Centroid => write!(f, "centroid"),
            DataMode::Fitted => write!(f, "fitted"),
        }
    }
}

/// Numeric precision of a stored (m/z, intensity) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeakEncoding {
    /// 32-bit m/z, 32-bit intensity (8 bytes)
    LowRes,
    /// 64-bit m/z, 32-bit intensity (12 bytes)
    HighRes,
    /// 64-bit m/z, 64-bit intensity (16 bytes)
    NoLoss,
}

impl PeakEncoding {
    /// Map the `mz_precision`/`intensity_precision` columns to an encoding
    pub fn from_precisions(mz_precision: i64, intensity_precision: i64) -> Option<Self> {
        match (mz_precision, intensity_precision) {
            (32, 32) => Some(PeakEncoding::LowRes),
            (64, 32) => Some(PeakEncoding::HighRes),
            (64, 64) => Some(PeakEncoding::NoLoss),
            _ => None,
        }
    }

    /// Byte width of the m/z value
    pub fn mz_size(&self) -> usize {
        match self {
            PeakEncoding::LowRes => 4,
            PeakEncoding::HighRes | PeakEncoding::NoLoss => 8,
        }
    }

    /// Byte width of the intensity value
    pub fn intensity_size(&self) -> usize {
        match self {
            PeakEncoding::LowRes | PeakEncoding::HighRes => 4,
            PeakEncoding::NoLoss => 8,
        }
    }

    /// Byte width of the (m/z, intensity) pair
    pub fn pair_size(&self) -> usize {
        self.mz_size() + self.intensity_size()
    }
}

/// Compression applied to a bounding box blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Raw bytes
    #[default]
    None,
    /// zlib stream covering the whole blob
    Zlib,
}

impl Compression {
    /// Parse the `data_encoding.compression` column value (NULL and "" mean none)
    pub fn from_db_value(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            None => Some(Compression::None),
            Some(v) if v.is_empty() || v == "none" => Some(Compression::None),
            Some(v) if v == "zlib" => Some(Compression::Zlib),
            Some(_) => None,
        }
    }
}

/// Byte order of numeric values in a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Least significant byte first
    LittleEndian,
    /// Most significant byte first
    BigEndian,
}

impl ByteOrder {
    /// Parse the `data_encoding.byte_order` column value
    pub fn from_db_value(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "little_endian" => Some(ByteOrder::LittleEndian),
            "big_endian" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }
}

/// Describes how the peaks of a spectrum are laid out on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEncoding {
    /// Row id in `data_encoding`
    pub id: i64,
    /// Profile, centroid or fitted
    pub mode: DataMode,
    /// Pair precision
    pub peak_encoding: PeakEncoding,
    /// Blob compression
    pub compression: Compression,
    /// Byte order of every number in the blob
    pub byte_order: ByteOrder,
}

impl DataEncoding {
    /// Bytes per stored peak, including the HWHM pair for fitted data
    pub fn peak_size(&self) -> usize {
        let pair = self.peak_encoding.pair_size();
        if self.mode == DataMode::Fitted {
            pair + 8
        } else {
            pair
        }
    }
}

/// A `data_encoding` row as stored, before validation
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataEncodingRow {
    pub id: i64,
    pub mode: String,
    pub compression: Option<String>,
    pub byte_order: String,
    pub mz_precision: i64,
    pub intensity_precision: i64,
}

impl DataEncodingRow {
    pub(crate) fn resolve(&self) -> Result<DataEncoding, DecodeError> {
        let unsupported = |what: String| DecodeError::UnsupportedEncoding {
            id: self.id,
            reason: what,
        };

        let mode = DataMode::from_db_value(&self.mode)
            .ok_or_else(|| unsupported(format!("mode '{}'", self.mode)))?;
        let peak_encoding =
            PeakEncoding::from_precisions(self.mz_precision, self.intensity_precision).ok_or_else(
                || {
                    unsupported(format!(
                        "precision {}/{}",
                        self.mz_precision, self.intensity_precision
                    ))
                },
            )?;
        let compression = Compression::from_db_value(self.compression.as_deref()).ok_or_else(
            || {
                unsupported(format!(
                    "compression '{}'",
                    self.compression.as_deref().unwrap_or_default()
                ))
            },
        )?;
        let byte_order = ByteOrder::from_db_value(&self.byte_order)
            .ok_or_else(|| unsupported(format!("byte order '{}'", self.byte_order)))?;

        Ok(DataEncoding {
            id: self.id,
            mode,
            peak_encoding,
            compression,
            byte_order,
        })
    }
}

/// The data encodings of a container, keyed by id.
///
/// Rows that fail validation are kept so that the count matches the table
/// and lookups report a [`DecodeError`] instead of a missing id.
#[derive(Debug, Clone, Default)]
pub struct DataEncodingTable {
    by_id: BTreeMap<i64, Result<DataEncoding, DecodeError>>,
}

impl DataEncodingTable {
    pub(crate) fn from_rows(rows: Vec<DataEncodingRow>) -> Self {
        let by_id = rows
            .into_iter()
            .map(|row| {
                let resolved = row.resolve();
                if let Err(ref e) = resolved {
                    log::warn!("Data encoding {} cannot be decoded: {}", row.id, e);
                }
                (row.id, resolved)
            })
            .collect();
        Self { by_id }
    }

    /// Number of rows in the table, including unsupported ones
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when the table holds no encoding
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Look up an encoding; `None` if the id does not exist
    pub fn get(&self, id: i64) -> Option<Result<&DataEncoding, DecodeError>> {
        self.by_id
            .get(&id)
            .map(|entry| entry.as_ref().map_err(Clone::clone))
    }

    /// Ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_id.keys().copied()
    }
}
