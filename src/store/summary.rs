use std::fmt;

use super::{MzdbError, MzdbStore};
use crate::model::BoundingBoxSizes;

/// Summary statistics about an mzDB file
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// mzDB schema version
    pub mzdb_version: String,
    /// Version of the software that wrote the file
    pub writer_version: Option<String>,
    /// Number of spectra
    pub num_spectra: usize,
    /// Number of spectra per MS level, ascending by level
    pub spectra_per_level: Vec<(i64, usize)>,
    /// Retention time range (min, max) in seconds
    pub rt_range: Option<(f32, f32)>,
    /// Last acquisition cycle
    pub last_cycle: Option<i64>,
    /// Number of bounding boxes
    pub num_bounding_boxes: usize,
    /// Number of run slices
    pub num_run_slices: usize,
    /// Number of data encodings
    pub num_data_encodings: usize,
    /// Bounding box dimensions
    pub bb_sizes: BoundingBoxSizes,
}

impl MzdbStore {
    /// Version of the mzDB schema
    pub fn get_mzdb_version(&self) -> Result<String, MzdbError> {
        Ok(self.index()?.version.clone())
    }

    /// Version of the mzDB writer recorded in the `software` table
    pub fn get_writer_version(&self) -> Result<Option<String>, MzdbError> {
        Ok(self.index()?.writer_version.clone())
    }

    /// Retention time of the last spectrum
    pub fn get_last_time(&self) -> Result<Option<f32>, MzdbError> {
        Ok(self.index()?.headers.last().map(|h| h.time))
    }

    /// Cycle number of the last spectrum
    pub fn get_last_cycle_number(&self) -> Result<Option<i64>, MzdbError> {
        Ok(self.index()?.headers.last().map(|h| h.cycle))
    }

    /// Highest MS level among the run slices
    pub fn get_max_ms_level(&self) -> Result<Option<i64>, MzdbError> {
        Ok(self.index()?.run_slices.iter().map(|rs| rs.ms_level).max())
    }

    /// Bounding box dimensions declared in the mzdb param tree
    pub fn bb_sizes(&self) -> Result<BoundingBoxSizes, MzdbError> {
        Ok(self.index()?.bb_sizes)
    }

    /// Get summary statistics about the file
    pub fn summary(&self) -> Result<FileSummary, MzdbError> {
        let index = self.index()?;
        let headers = &index.headers;

        let mut spectra_per_level: Vec<(i64, usize)> = Vec::new();
        for header in headers {
            match spectra_per_level
                .iter_mut()
                .find(|(level, _)| *level == header.ms_level)
            {
                Some((_, count)) => *count += 1,
                None => spectra_per_level.push((header.ms_level, 1)),
            }
        }
        spectra_per_level.sort_unstable();

        let rt_range = if !headers.is_empty() {
            let min_rt = headers.iter().map(|h| h.time).fold(f32::MAX, f32::min);
            let max_rt = headers.iter().map(|h| h.time).fold(f32::MIN, f32::max);
            Some((min_rt, max_rt))
        } else {
            None
        };

        Ok(FileSummary {
            mzdb_version: index.version.clone(),
            writer_version: index.writer_version.clone(),
            num_spectra: headers.len(),
            spectra_per_level,
            rt_range,
            last_cycle: headers.last().map(|h| h.cycle),
            num_bounding_boxes: index.bounding_boxes.len(),
            num_run_slices: index.run_slices.len(),
            num_data_encodings: index.encodings.len(),
            bb_sizes: index.bb_sizes,
        })
    }
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mzDB File Summary")?;
        writeln!(f, "=================")?;
        writeln!(f, "mzDB version: {}", self.mzdb_version)?;
        if let Some(ref writer) = self.writer_version {
            writeln!(f, "Writer version: {}", writer)?;
        }
        writeln!(f, "Total spectra: {}", self.num_spectra)?;
        for (level, count) in &self.spectra_per_level {
            writeln!(f, "  MS{} spectra: {}", level, count)?;
        }
        if let Some((min_rt, max_rt)) = self.rt_range {
            writeln!(f, "RT range: {:.2} - {:.2} sec", min_rt, max_rt)?;
        }
        if let Some(cycle) = self.last_cycle {
            writeln!(f, "Last cycle: {}", cycle)?;
        }
        writeln!(f, "Bounding boxes: {}", self.num_bounding_boxes)?;
        writeln!(f, "Run slices: {}", self.num_run_slices)?;
        writeln!(f, "Data encodings: {}", self.num_data_encodings)?;
        writeln!(
            f,
            "BB size: MS1 {} m/z x {} s, MSn {} m/z x {} s",
            self.bb_sizes.ms1_mz_height,
            self.bb_sizes.ms1_rt_width,
            self.bb_sizes.msn_mz_height,
            self.bb_sizes.msn_rt_width
        )?;
        Ok(())
    }
}
