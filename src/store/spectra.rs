use rusqlite::Connection;

use super::index::StoreIndex;
use super::{MzdbError, MzdbStore};
use crate::codec::{BlobDecoder, BoundingBoxIndex, DecodeError, PeakBuffer};
use crate::model::{Compression, DataEncoding, DataMode, Spectrum, SpectrumData, SpectrumHeader};

// Boxes pointing at a missing run slice sort last and are reported by `load`
const GROUP_SQL: &str = "SELECT bb.id, bb.data, bb.run_slice_id, rs.id FROM bounding_box bb \
     LEFT JOIN run_slice rs ON rs.id = bb.run_slice_id \
     WHERE bb.first_spectrum_id = ?1 ORDER BY rs.begin_mz IS NULL, rs.begin_mz";

const GROUP_IN_MZ_RANGE_SQL: &str = "SELECT bb.id, bb.data, bb.run_slice_id, rs.id FROM bounding_box bb \
     LEFT JOIN run_slice rs ON rs.id = bb.run_slice_id \
     WHERE bb.first_spectrum_id = ?1 \
     AND (rs.id IS NULL OR (rs.end_mz >= ?2 AND rs.begin_mz <= ?3)) \
     ORDER BY rs.begin_mz IS NULL, rs.begin_mz";

type GroupRow = (i64, Vec<u8>, i64, Option<i64>);

/// The bounding boxes sharing one `first_spectrum_id`, ordered by m/z
///
/// Blobs are held uncompressed together with their slice index.
pub(super) struct BoundingBoxGroup {
    boxes: Vec<(BoundingBoxIndex, Vec<u8>)>,
}

impl BoundingBoxGroup {
    /// Read and index the group starting at `first_spectrum_id`
    ///
    /// Compression and slice header byte order follow the encoding of the
    /// first spectrum; each slice is walked with its own spectrum's encoding.
    pub fn load(
        conn: &Connection,
        index: &StoreIndex,
        first_spectrum_id: i64,
        mz_range: Option<(f64, f64)>,
    ) -> Result<Self, MzdbError> {
        let first = index
            .header(first_spectrum_id)
            .ok_or_else(|| MzdbError::not_found("spectrum", first_spectrum_id))?;
        let encoding = index.encoding(first.data_encoding_id)?;

        let rows: Vec<GroupRow> = match mz_range {
            None => {
                let mut stmt = conn.prepare_cached(GROUP_SQL)?;
                let rows = stmt.query_map([first_spectrum_id], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?;
                rows.collect::<rusqlite::Result<_>>()?
            }
            Some((min_mz, max_mz)) => {
                let mut stmt = conn.prepare_cached(GROUP_IN_MZ_RANGE_SQL)?;
                let rows = stmt.query_map(
                    rusqlite::params![first_spectrum_id, min_mz, max_mz],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )?;
                rows.collect::<rusqlite::Result<_>>()?
            }
        };

        let mut boxes = Vec::with_capacity(rows.len());
        for (bb_id, blob, run_slice_id, run_slice) in rows {
            if run_slice.is_none() {
                return Err(DecodeError::Corrupt {
                    bb_id,
                    reason: format!("run slice {} does not exist", run_slice_id),
                }
                .into());
            }

            let bytes = if encoding.compression == Compression::None {
                blob
            } else {
                BlobDecoder::decompress(&blob, encoding)?.into_owned()
            };
            let bb_index = BlobDecoder::index(bb_id, &bytes, encoding.byte_order, |spectrum_id| {
                slice_encoding(index, bb_id, spectrum_id)
            })?;
            boxes.push((bb_index, bytes));
        }

        log::debug!(
            "Loaded {} bounding boxes of group {}",
            boxes.len(),
            first_spectrum_id
        );
        Ok(Self { boxes })
    }

    /// Concatenate the slices of a spectrum across the group
    ///
    /// Without an m/z window the decoded peaks must match the header's
    /// declared count.
    pub fn spectrum_data(
        &self,
        header: &SpectrumHeader,
        encoding: &DataEncoding,
        mz_range: Option<(f64, f64)>,
    ) -> Result<SpectrumData, DecodeError> {
        let mut peaks = PeakBuffer::default();
        let mut slices = 0usize;
        for (bb_index, bytes) in &self.boxes {
            if let Some(slice) = bb_index.slice_for(header.id) {
                let mut slice_peaks = BlobDecoder::read_slice(bytes, slice, mz_range);
                peaks.append(&mut slice_peaks);
                slices += 1;
            }
        }

        if mz_range.is_none() {
            if slices == 0 && header.peaks_count > 0 {
                return Err(DecodeError::MissingSlices {
                    spectrum_id: header.id,
                    declared: header.peaks_count,
                });
            }
            if peaks.len() as i64 != header.peaks_count {
                return Err(DecodeError::PeakCountMismatch {
                    spectrum_id: header.id,
                    declared: header.peaks_count,
                    decoded: peaks.len(),
                });
            }
        }

        let fitted = encoding.mode == DataMode::Fitted;
        SpectrumData::new(
            encoding.clone(),
            peaks.mz,
            peaks.intensity,
            fitted.then_some(peaks.left_hwhm),
            fitted.then_some(peaks.right_hwhm),
        )
    }
}

/// Encoding of the spectrum a slice belongs to
fn slice_encoding(
    index: &StoreIndex,
    bb_id: i64,
    spectrum_id: i64,
) -> Result<DataEncoding, DecodeError> {
    let header = index.header(spectrum_id).ok_or_else(|| DecodeError::Corrupt {
        bb_id,
        reason: format!("slice of unknown spectrum {}", spectrum_id),
    })?;
    match index.encodings.get(header.data_encoding_id) {
        Some(encoding) => encoding.cloned(),
        None => Err(DecodeError::Corrupt {
            bb_id,
            reason: format!(
                "spectrum {} references missing data encoding {}",
                spectrum_id, header.data_encoding_id
            ),
        }),
    }
}

impl MzdbStore {
    /// Get the header of a spectrum
    pub fn get_spectrum_header(&self, spectrum_id: i64) -> Result<SpectrumHeader, MzdbError> {
        self.index()?
            .header(spectrum_id)
            .cloned()
            .ok_or_else(|| MzdbError::not_found("spectrum", spectrum_id))
    }

    /// All spectrum headers, ascending by id
    pub fn spectrum_headers(&self) -> Result<Vec<SpectrumHeader>, MzdbError> {
        Ok(self.index()?.headers.clone())
    }

    /// Number of spectra, optionally restricted to one MS level
    pub fn get_spectra_count(&self, ms_level: Option<u8>) -> Result<usize, MzdbError> {
        let headers = &self.index()?.headers;
        Ok(match ms_level {
            None => headers.len(),
            Some(level) => headers
                .iter()
                .filter(|h| h.ms_level == level as i64)
                .count(),
        })
    }

    /// Ids of the spectra with `min_time <= time <= max_time`, ascending
    pub fn get_spectrum_ids_in_time_range(
        &self,
        min_time: f32,
        max_time: f32,
        ms_level: Option<u8>,
    ) -> Result<Vec<i64>, MzdbError> {
        self.spectrum_ids_where(ms_level, |h| h.time >= min_time && h.time <= max_time)
    }

    /// Ids of the spectra acquired in cycles `min_cycle..=max_cycle`, ascending
    pub fn get_spectrum_ids_in_cycle_range(
        &self,
        min_cycle: i64,
        max_cycle: i64,
        ms_level: Option<u8>,
    ) -> Result<Vec<i64>, MzdbError> {
        self.spectrum_ids_where(ms_level, |h| h.cycle >= min_cycle && h.cycle <= max_cycle)
    }

    /// Ids of the MS2 spectra whose main precursor m/z is in `[min_mz, max_mz]`
    pub fn get_ms2_spectrum_ids_for_precursor_mz(
        &self,
        min_mz: f64,
        max_mz: f64,
    ) -> Result<Vec<i64>, MzdbError> {
        self.spectrum_ids_where(Some(2), |h| {
            h.precursor_mz
                .map_or(false, |mz| mz >= min_mz && mz <= max_mz)
        })
    }

    fn spectrum_ids_where(
        &self,
        ms_level: Option<u8>,
        predicate: impl Fn(&SpectrumHeader) -> bool,
    ) -> Result<Vec<i64>, MzdbError> {
        Ok(self
            .index()?
            .headers
            .iter()
            .filter(|h| ms_level.map_or(true, |level| h.ms_level == level as i64))
            .filter(|&h| predicate(h))
            .map(|h| h.id)
            .collect())
    }

    /// Decode the peaks of a spectrum
    ///
    /// Reads every bounding box of the spectrum's group and concatenates the
    /// spectrum's slices in m/z order.
    pub fn get_spectrum_data(&self, spectrum_id: i64) -> Result<SpectrumData, MzdbError> {
        self.decode_spectrum(spectrum_id, None)
    }

    /// Decode the peaks of a spectrum with `min_mz <= mz <= max_mz`
    ///
    /// Bounding boxes whose run slice lies outside the window are not read.
    pub fn get_spectrum_data_in_mz_range(
        &self,
        spectrum_id: i64,
        min_mz: f64,
        max_mz: f64,
    ) -> Result<SpectrumData, MzdbError> {
        self.decode_spectrum(spectrum_id, Some((min_mz, max_mz)))
    }

    /// Get a spectrum header together with its peaks
    pub fn get_spectrum(&self, spectrum_id: i64) -> Result<Spectrum, MzdbError> {
        let header = self.get_spectrum_header(spectrum_id)?;
        let data = self.get_spectrum_data(spectrum_id)?;
        Ok(Spectrum { header, data })
    }

    /// Number of rows in the `data_encoding` table
    pub fn get_data_encoding_count(&self) -> Result<usize, MzdbError> {
        Ok(self.index()?.encodings.len())
    }

    /// Get a data encoding by id
    pub fn get_data_encoding(&self, id: i64) -> Result<DataEncoding, MzdbError> {
        Ok(self.index()?.encoding(id)?.clone())
    }

    /// Get the data encoding a spectrum is stored with
    pub fn get_data_encoding_for_spectrum(
        &self,
        spectrum_id: i64,
    ) -> Result<DataEncoding, MzdbError> {
        let header = self.get_spectrum_header(spectrum_id)?;
        self.get_data_encoding(header.data_encoding_id)
    }

    fn decode_spectrum(
        &self,
        spectrum_id: i64,
        mz_range: Option<(f64, f64)>,
    ) -> Result<SpectrumData, MzdbError> {
        let index = self.index()?;
        let header = index
            .header(spectrum_id)
            .ok_or_else(|| MzdbError::not_found("spectrum", spectrum_id))?;

        let encoding = index.encoding(header.data_encoding_id)?;

        let group = self.with_connection(|conn| {
            BoundingBoxGroup::load(conn, index, header.bb_first_spectrum_id, mz_range)
        })?;
        Ok(group.spectrum_data(header, encoding, mz_range)?)
    }
}
