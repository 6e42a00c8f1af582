use serde::{Deserialize, Serialize};

use super::{DataEncoding, SpectrumHeader};
use crate::codec::DecodeError;

/// Decoded peaks of one spectrum in SoA layout
///
/// `mz_list` and `intensity_list` always have the same length and `mz_list`
/// is non-decreasing. The HWHM lists are only filled for fitted data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumData {
    /// Encoding the peaks were decoded with
    pub data_encoding: DataEncoding,
    /// m/z values
    pub mz_list: Vec<f64>,
    /// Intensity values
    pub intensity_list: Vec<f32>,
    /// Left half-width at half-maximum (fitted data only)
    pub left_hwhm_list: Option<Vec<f32>>,
    /// Right half-width at half-maximum (fitted data only)
    pub right_hwhm_list: Option<Vec<f32>>,
}

impl SpectrumData {
    /// Build spectrum data, checking that all arrays have the same length
    pub fn new(
        data_encoding: DataEncoding,
        mz_list: Vec<f64>,
        intensity_list: Vec<f32>,
        left_hwhm_list: Option<Vec<f32>>,
        right_hwhm_list: Option<Vec<f32>>,
    ) -> Result<Self, DecodeError> {
        let n = mz_list.len();
        let check = |name: &'static str, len: usize| {
            if len == n {
                Ok(())
            } else {
                Err(DecodeError::LengthMismatch {
                    array: name,
                    expected: n,
                    actual: len,
                })
            }
        };
        check("intensity", intensity_list.len())?;
        if let Some(ref l) = left_hwhm_list {
            check("left_hwhm", l.len())?;
        }
        if let Some(ref r) = right_hwhm_list {
            check("right_hwhm", r.len())?;
        }

        let mut data = Self {
            data_encoding,
            mz_list,
            intensity_list,
            left_hwhm_list,
            right_hwhm_list,
        };
        data.sort_by_mz();
        Ok(data)
    }

    /// Number of peaks
    pub fn peaks_count(&self) -> usize {
        self.mz_list.len()
    }

    /// True when the spectrum has no peak
    pub fn is_empty(&self) -> bool {
        self.mz_list.is_empty()
    }

    /// Smallest and largest m/z, `None` for an empty spectrum
    pub fn mz_range(&self) -> Option<(f64, f64)> {
        Some((*self.mz_list.first()?, *self.mz_list.last()?))
    }

    /// Iterate over (m/z, intensity) pairs
    pub fn peaks(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        self.mz_list
            .iter()
            .copied()
            .zip(self.intensity_list.iter().copied())
    }

    /// Reorder all arrays by ascending m/z (stable), a no-op when already sorted
    fn sort_by_mz(&mut self) {
        if self.mz_list.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }
        log::warn!(
            "Peaks of a {} spectrum are out of m/z order, sorting {} peaks",
            self.data_encoding.mode,
            self.mz_list.len()
        );

        let mut order: Vec<usize> = (0..self.mz_list.len()).collect();
        order.sort_by(|&a, &b| self.mz_list[a].total_cmp(&self.mz_list[b]));

        self.mz_list = order.iter().map(|&i| self.mz_list[i]).collect();
        self.intensity_list = order.iter().map(|&i| self.intensity_list[i]).collect();
        if let Some(ref mut l) = self.left_hwhm_list {
            *l = order.iter().map(|&i| l[i]).collect();
        }
        if let Some(ref mut r) = self.right_hwhm_list {
            *r = order.iter().map(|&i| r[i]).collect();
        }
    }
}

/// A spectrum header together with its decoded peaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Spectrum metadata
    pub header: SpectrumHeader,
    /// Decoded peaks
    pub data: SpectrumData,
}
