use super::{MzdbError, MzdbStore};
use crate::model::{BoundingBox, RunSlice};

impl MzdbStore {
    /// Get a bounding box descriptor by id
    pub fn get_bounding_box(&self, bb_id: i64) -> Result<BoundingBox, MzdbError> {
        self.bounding_box_ref(bb_id).cloned()
    }

    /// Lower m/z bound of a bounding box
    pub fn get_bounding_box_min_mz(&self, bb_id: i64) -> Result<f64, MzdbError> {
        Ok(self.bounding_box_ref(bb_id)?.min_mz)
    }

    /// Lower retention time bound of a bounding box
    pub fn get_bounding_box_min_time(&self, bb_id: i64) -> Result<f64, MzdbError> {
        Ok(self.bounding_box_ref(bb_id)?.min_time)
    }

    /// Run slice of a bounding box
    pub fn get_bounding_box_run_slice_id(&self, bb_id: i64) -> Result<i64, MzdbError> {
        Ok(self.bounding_box_ref(bb_id)?.run_slice_id)
    }

    /// First spectrum of a bounding box
    pub fn get_bounding_box_first_spectrum_id(&self, bb_id: i64) -> Result<i64, MzdbError> {
        Ok(self.bounding_box_ref(bb_id)?.first_spectrum_id)
    }

    /// MS level of a bounding box
    pub fn get_bounding_box_ms_level(&self, bb_id: i64) -> Result<i64, MzdbError> {
        Ok(self.bounding_box_ref(bb_id)?.ms_level)
    }

    /// Data encoding of a bounding box, the one of its first spectrum
    pub fn get_bounding_box_data_encoding_id(&self, bb_id: i64) -> Result<i64, MzdbError> {
        let first_spectrum_id = self.bounding_box_ref(bb_id)?.first_spectrum_id;
        let header = self
            .index()?
            .header(first_spectrum_id)
            .ok_or_else(|| MzdbError::not_found("spectrum", first_spectrum_id))?;
        Ok(header.data_encoding_id)
    }

    /// Number of bounding boxes in the container
    pub fn get_bounding_boxes_count(&self) -> Result<usize, MzdbError> {
        Ok(self.index()?.bounding_boxes.len())
    }

    /// Number of bounding boxes of one run slice
    pub fn get_run_slice_bounding_boxes_count(
        &self,
        run_slice_id: i64,
    ) -> Result<usize, MzdbError> {
        let index = self.index()?;
        if index.run_slice(run_slice_id).is_none() {
            return Err(MzdbError::not_found("run slice", run_slice_id));
        }
        Ok(index
            .bounding_boxes
            .iter()
            .filter(|bb| bb.run_slice_id == run_slice_id)
            .count())
    }

    /// Bounding boxes of one MS level intersecting an m/z and retention time window
    ///
    /// Ranges are inclusive. Results are ordered by id.
    pub fn bounding_boxes_in_region(
        &self,
        mz_range: (f64, f64),
        time_range: (f64, f64),
        ms_level: u8,
    ) -> Result<Vec<BoundingBox>, MzdbError> {
        let (min_mz, max_mz) = mz_range;
        let (min_time, max_time) = time_range;
        Ok(self
            .index()?
            .bounding_boxes
            .iter()
            .filter(|bb| bb.ms_level == ms_level as i64)
            .filter(|bb| bb.overlaps_mz(min_mz, max_mz) && bb.overlaps_time(min_time, max_time))
            .cloned()
            .collect())
    }

    /// Get a run slice by id
    pub fn get_run_slice(&self, run_slice_id: i64) -> Result<RunSlice, MzdbError> {
        self.index()?
            .run_slice(run_slice_id)
            .cloned()
            .ok_or_else(|| MzdbError::not_found("run slice", run_slice_id))
    }

    /// Run slices ordered by id, optionally restricted to one MS level
    pub fn run_slices(&self, ms_level: Option<u8>) -> Result<Vec<RunSlice>, MzdbError> {
        Ok(self
            .index()?
            .run_slices
            .iter()
            .filter(|rs| ms_level.map_or(true, |level| rs.ms_level == level as i64))
            .cloned()
            .collect())
    }

    fn bounding_box_ref(&self, bb_id: i64) -> Result<&BoundingBox, MzdbError> {
        self.index()?
            .bounding_box(bb_id)
            .ok_or_else(|| MzdbError::not_found("bounding box", bb_id))
    }
}
