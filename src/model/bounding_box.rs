use serde::{Deserialize, Serialize};

use crate::param_tree::ParamTree;

/// Index record of one bounding box
///
/// A bounding box groups the peaks of consecutive spectra that fall into one
/// run slice (m/z window) and one retention-time window. The peak blob itself
/// is not held here, only its byte length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Row id in `bounding_box`
    pub id: i64,
    /// Run slice the box belongs to
    pub run_slice_id: i64,
    /// First spectrum stored in the box
    pub first_spectrum_id: i64,
    /// Last spectrum stored in the box
    pub last_spectrum_id: i64,
    /// MS level of the run slice
    pub ms_level: i64,
    /// Lower m/z bound
    pub min_mz: f64,
    /// Upper m/z bound
    pub max_mz: f64,
    /// Lower retention time bound (seconds)
    pub min_time: f64,
    /// Upper retention time bound (seconds)
    pub max_time: f64,
    /// Size of the stored blob in bytes
    pub data_size: usize,
}

impl BoundingBox {
    /// True if `spectrum_id` lies in the box's spectrum range
    pub fn contains_spectrum(&self, spectrum_id: i64) -> bool {
        spectrum_id >= self.first_spectrum_id && spectrum_id <= self.last_spectrum_id
    }

    /// True if the box's m/z range intersects `[min_mz, max_mz]`
    pub fn overlaps_mz(&self, min_mz: f64, max_mz: f64) -> bool {
        self.min_mz <= max_mz && self.max_mz >= min_mz
    }

    /// True if the box's time range intersects `[min_time, max_time]`
    pub fn overlaps_time(&self, min_time: f64, max_time: f64) -> bool {
        self.min_time <= max_time && self.max_time >= min_time
    }
}

/// An m/z partition of a run at one MS level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSlice {
    /// Row id in `run_slice`
    pub id: i64,
    /// MS level
    pub ms_level: i64,
    /// Slice number within its MS level
    pub number: i64,
    /// Lower m/z bound
    pub begin_mz: f64,
    /// Upper m/z bound
    pub end_mz: f64,
    /// Run id
    pub run_id: i64,
}

/// Bounding box dimensions declared in the mzdb-level param tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxSizes {
    /// m/z height of MS1 boxes
    pub ms1_mz_height: f64,
    /// m/z height of MSn boxes
    pub msn_mz_height: f64,
    /// RT width of MS1 boxes (seconds)
    pub ms1_rt_width: f32,
    /// RT width of MSn boxes (seconds)
    pub msn_rt_width: f32,
}

impl BoundingBoxSizes {
    /// Read the sizes from `ms1_bb_mz_width`-style user params; missing entries are 0
    pub fn from_param_tree(tree: &ParamTree) -> Self {
        Self {
            ms1_mz_height: tree.user_param_value("ms1_bb_mz_width").unwrap_or_default(),
            msn_mz_height: tree.user_param_value("msn_bb_mz_width").unwrap_or_default(),
            ms1_rt_width: tree.user_param_value("ms1_bb_time_width").unwrap_or_default(),
            msn_rt_width: tree.user_param_value("msn_bb_time_width").unwrap_or_default(),
        }
    }
}
