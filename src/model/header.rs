use serde::{Deserialize, Serialize};

/// Metadata of one spectrum, as stored in the `spectrum` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumHeader {
    /// Spectrum id (1-based, ascending in acquisition order)
    pub id: i64,
    /// Native id of the spectrum in the source file
    pub initial_id: i64,
    /// Spectrum title
    pub title: String,
    /// Acquisition cycle number
    pub cycle: i64,
    /// Retention time in seconds
    pub time: f32,
    /// MS level (1 for survey scans)
    pub ms_level: i64,
    /// Activation type (e.g., "HCD"), MSn only
    pub activation_type: Option<String>,
    /// Total ion current
    pub tic: f32,
    /// m/z of the base peak
    pub base_peak_mz: f64,
    /// Intensity of the base peak
    pub base_peak_intensity: f32,
    /// Main precursor m/z, MSn only
    pub precursor_mz: Option<f64>,
    /// Main precursor charge, MSn only
    pub precursor_charge: Option<i32>,
    /// Number of stored peaks
    pub peaks_count: i64,
    /// Id of the shared param tree, if any
    pub shared_param_tree_id: Option<i64>,
    /// Instrument configuration id
    pub instrument_configuration_id: i64,
    /// Source file id
    pub source_file_id: i64,
    /// Run id
    pub run_id: i64,
    /// Data processing id
    pub data_processing_id: i64,
    /// Data encoding id
    pub data_encoding_id: i64,
    /// `first_spectrum_id` of the bounding boxes holding this spectrum
    pub bb_first_spectrum_id: i64,
}

impl SpectrumHeader {
    /// Every field name, in declaration order
    pub const FIELD_NAMES: [&'static str; 20] = [
        "id",
        "initial_id",
        "title",
        "cycle",
        "time",
        "ms_level",
        "activation_type",
        "tic",
        "base_peak_mz",
        "base_peak_intensity",
        "precursor_mz",
        "precursor_charge",
        "peaks_count",
        "shared_param_tree_id",
        "instrument_configuration_id",
        "source_file_id",
        "run_id",
        "data_processing_id",
        "data_encoding_id",
        "bb_first_spectrum_id",
    ];

    /// Column list matching [`SpectrumHeader::from_row`]
    pub(crate) const SQL_COLUMNS: &'static str = "id, initial_id, title, cycle, time, ms_level, \
         activation_type, tic, base_peak_mz, base_peak_intensity, main_precursor_mz, \
         main_precursor_charge, data_points_count, shared_param_tree_id, \
         instrument_configuration_id, source_file_id, run_id, data_processing_id, \
         data_encoding_id, bb_first_spectrum_id";

    /// Build a header from a row selected with [`SpectrumHeader::SQL_COLUMNS`]
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            initial_id: row.get(1)?,
            title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            cycle: row.get(3)?,
            time: row.get(4)?,
            ms_level: row.get(5)?,
            activation_type: row.get(6)?,
            tic: row.get::<_, Option<f32>>(7)?.unwrap_or_default(),
            base_peak_mz: row.get::<_, Option<f64>>(8)?.unwrap_or_default(),
            base_peak_intensity: row.get::<_, Option<f32>>(9)?.unwrap_or_default(),
            precursor_mz: row.get(10)?,
            precursor_charge: row.get(11)?,
            peaks_count: row.get(12)?,
            shared_param_tree_id: row.get(13)?,
            instrument_configuration_id: row.get(14)?,
            source_file_id: row.get(15)?,
            run_id: row.get(16)?,
            data_processing_id: row.get(17)?,
            data_encoding_id: row.get(18)?,
            bb_first_spectrum_id: row.get(19)?,
        })
    }

    /// True for MS2 and higher
    pub fn is_msn(&self) -> bool {
        self.ms_level > 1
    }

    /// Serialize to a JSON object keyed by [`SpectrumHeader::FIELD_NAMES`]
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing a plain struct of scalars cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
