//! Bounding box blob decoding
//!
//! A bounding box blob is a sequence of spectrum slices. Each slice holds:
//!
//! 1. the spectrum id (`i32`)
//! 2. the number of peaks in the slice (`i32`)
//! 3. the peaks, `peak_size` bytes each: m/z, intensity and, for fitted
//!    data, the left/right half-widths at half-maximum (two `f32`)
//!
//! A box may hold spectra stored with different encodings, so the peak size
//! of each slice comes from the encoding of its own spectrum. Slice headers
//! use the byte order of the box's first spectrum; a zlib compressed
//! encoding covers the whole blob.

use std::borrow::Cow;
use std::io::Read;

use byteorder::{BigEndian, LittleEndian};
use flate2::read::ZlibDecoder;

use crate::model::{ByteOrder, Compression, DataEncoding, DataMode, PeakEncoding};

/// Size of the slice header (spectrum id + peak count)
const SLICE_HEADER_SIZE: usize = 8;

/// Errors raised while decoding stored data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Encoding row with values this reader does not handle
    #[error("Unsupported data encoding {id}: {reason}")]
    UnsupportedEncoding {
        /// Data encoding id
        id: i64,
        /// What is unsupported
        reason: String,
    },

    /// The blob could not be decompressed
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// A slice runs past the end of the blob
    #[error(
        "Truncated bounding box {bb_id}: slice at byte {offset} needs {needed} bytes, {available} available"
    )]
    Truncated {
        /// Bounding box id
        bb_id: i64,
        /// Byte offset of the slice
        offset: usize,
        /// Bytes the slice declares
        needed: usize,
        /// Bytes left in the blob
        available: usize,
    },

    /// Structurally invalid blob content
    #[error("Corrupt bounding box {bb_id}: {reason}")]
    Corrupt {
        /// Bounding box id
        bb_id: i64,
        /// What is wrong
        reason: String,
    },

    /// A spectrum declares peaks that none of its bounding boxes hold
    #[error("Spectrum {spectrum_id} declares {declared} peaks but no bounding box has a slice of it")]
    MissingSlices {
        /// Spectrum id
        spectrum_id: i64,
        /// `spectrum.data_points_count`
        declared: i64,
    },

    /// The decoded peaks do not add up to the spectrum header's count
    #[error("Spectrum {spectrum_id} declares {declared} peaks, {decoded} decoded")]
    PeakCountMismatch {
        /// Spectrum id
        spectrum_id: i64,
        /// `spectrum.data_points_count`
        declared: i64,
        /// Peaks found across the spectrum's slices
        decoded: usize,
    },

    /// Structurally invalid chromatogram blob
    #[error("Corrupt chromatogram {id}: {reason}")]
    CorruptChromatogram {
        /// Chromatogram id
        id: i64,
        /// What is wrong
        reason: String,
    },

    /// Parallel arrays of different lengths
    #[error("Invalid data length for {array}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Array name
        array: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Param tree XML that cannot be parsed
    #[error("Invalid XML: {0}")]
    InvalidXml(String),
}

/// Position of one spectrum slice inside a blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceIndex {
    /// Spectrum the slice belongs to
    pub spectrum_id: i64,
    /// Encoding of that spectrum, which sets the peak layout
    pub encoding: DataEncoding,
    /// Byte offset of the first peak
    pub peaks_offset: usize,
    /// Number of peaks in the slice
    pub peaks_count: usize,
}

/// Slice layout of a bounding box blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBoxIndex {
    /// Bounding box id
    pub bb_id: i64,
    /// Slices in storage order
    pub slices: Vec<SliceIndex>,
}

impl BoundingBoxIndex {
    /// Find the slice of a spectrum
    pub fn slice_for(&self, spectrum_id: i64) -> Option<&SliceIndex> {
        self.slices.iter().find(|s| s.spectrum_id == spectrum_id)
    }
}

/// Peaks decoded from one or more slices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakBuffer {
    /// m/z values
    pub mz: Vec<f64>,
    /// Intensity values
    pub intensity: Vec<f32>,
    /// Left HWHM, fitted data only
    pub left_hwhm: Vec<f32>,
    /// Right HWHM, fitted data only
    pub right_hwhm: Vec<f32>,
}

impl PeakBuffer {
    fn with_capacity(n: usize, fitted: bool) -> Self {
        let hwhm = if fitted { n } else { 0 };
        Self {
            mz: Vec::with_capacity(n),
            intensity: Vec::with_capacity(n),
            left_hwhm: Vec::with_capacity(hwhm),
            right_hwhm: Vec::with_capacity(hwhm),
        }
    }

    /// Move the peaks of `other` to the end of this buffer
    pub fn append(&mut self, other: &mut PeakBuffer) {
        self.mz.append(&mut other.mz);
        self.intensity.append(&mut other.intensity);
        self.left_hwhm.append(&mut other.left_hwhm);
        self.right_hwhm.append(&mut other.right_hwhm);
    }

    /// Number of peaks
    pub fn len(&self) -> usize {
        self.mz.len()
    }

    /// True when no peak was decoded
    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }
}

/// Decoder for bounding box blobs
pub struct BlobDecoder;

impl BlobDecoder {
    /// Undo the encoding's compression
    pub fn decompress<'a>(
        blob: &'a [u8],
        encoding: &DataEncoding,
    ) -> Result<Cow<'a, [u8]>, DecodeError> {
        match encoding.compression {
            Compression::None => Ok(Cow::Borrowed(blob)),
            Compression::Zlib => {
                let mut decoder = ZlibDecoder::new(blob);
                let mut uncompressed = Vec::new();
                decoder
                    .read_to_end(&mut uncompressed)
                    .map_err(|e| DecodeError::Decompression(e.to_string()))?;
                Ok(Cow::Owned(uncompressed))
            }
        }
    }

    /// Walk the slice headers of an uncompressed blob
    ///
    /// `encoding_of` maps the spectrum id found in each slice header to the
    /// encoding its peaks are stored with.
    pub fn index<F>(
        bb_id: i64,
        bytes: &[u8],
        byte_order: ByteOrder,
        encoding_of: F,
    ) -> Result<BoundingBoxIndex, DecodeError>
    where
        F: FnMut(i64) -> Result<DataEncoding, DecodeError>,
    {
        match byte_order {
            ByteOrder::LittleEndian => index_slices::<LittleEndian, F>(bb_id, bytes, encoding_of),
            ByteOrder::BigEndian => index_slices::<BigEndian, F>(bb_id, bytes, encoding_of),
        }
    }

    /// Decode the peaks of one slice, optionally keeping only `[min_mz, max_mz]`
    pub fn read_slice(bytes: &[u8], slice: &SliceIndex, mz_range: Option<(f64, f64)>) -> PeakBuffer {
        match slice.encoding.byte_order {
            ByteOrder::LittleEndian => read_peaks::<LittleEndian>(bytes, slice, mz_range),
            ByteOrder::BigEndian => read_peaks::<BigEndian>(bytes, slice, mz_range),
        }
    }

    /// Decode an uncompressed chromatogram blob into times and intensities
    ///
    /// The blob is a bare sequence of (time, intensity) pairs using the
    /// encoding's pair precision.
    pub fn read_chromatogram(
        id: i64,
        bytes: &[u8],
        encoding: &DataEncoding,
    ) -> Result<(Vec<f64>, Vec<f32>), DecodeError> {
        let pair_size = encoding.peak_encoding.pair_size();
        if bytes.len() % pair_size != 0 {
            return Err(DecodeError::CorruptChromatogram {
                id,
                reason: format!(
                    "{} bytes is not a whole number of {}-byte points",
                    bytes.len(),
                    pair_size
                ),
            });
        }
        Ok(match encoding.byte_order {
            ByteOrder::LittleEndian => read_points::<LittleEndian>(bytes, encoding.peak_encoding),
            ByteOrder::BigEndian => read_points::<BigEndian>(bytes, encoding.peak_encoding),
        })
    }
}

fn read_points<B: byteorder::ByteOrder>(bytes: &[u8], pe: PeakEncoding) -> (Vec<f64>, Vec<f32>) {
    let mz_size = pe.mz_size();
    let pair_size = pe.pair_size();
    let n = bytes.len() / pair_size;
    let mut times = Vec::with_capacity(n);
    let mut intensities = Vec::with_capacity(n);

    for point in bytes.chunks_exact(pair_size) {
        times.push(match pe {
            PeakEncoding::LowRes => B::read_f32(&point[..4]) as f64,
            PeakEncoding::HighRes | PeakEncoding::NoLoss => B::read_f64(&point[..8]),
        });
        intensities.push(match pe {
            PeakEncoding::NoLoss => B::read_f64(&point[mz_size..]) as f32,
            PeakEncoding::LowRes | PeakEncoding::HighRes => B::read_f32(&point[mz_size..]),
        });
    }

    (times, intensities)
}

fn index_slices<B, F>(
    bb_id: i64,
    bytes: &[u8],
    mut encoding_of: F,
) -> Result<BoundingBoxIndex, DecodeError>
where
    B: byteorder::ByteOrder,
    F: FnMut(i64) -> Result<DataEncoding, DecodeError>,
{
    let mut slices = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let available = bytes.len() - offset;
        if available < SLICE_HEADER_SIZE {
            return Err(DecodeError::Truncated {
                bb_id,
                offset,
                needed: SLICE_HEADER_SIZE,
                available,
            });
        }

        let spectrum_id = B::read_i32(&bytes[offset..offset + 4]);
        let peaks_count = B::read_i32(&bytes[offset + 4..offset + 8]);
        if spectrum_id <= 0 || peaks_count < 0 {
            return Err(DecodeError::Corrupt {
                bb_id,
                reason: format!(
                    "slice at byte {} has spectrum id {} and {} peaks",
                    offset, spectrum_id, peaks_count
                ),
            });
        }

        let encoding = encoding_of(spectrum_id as i64)?;
        let peaks_count = peaks_count as usize;
        let needed = peaks_count
            .checked_mul(encoding.peak_size())
            .and_then(|n| n.checked_add(SLICE_HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if needed > available {
            return Err(DecodeError::Truncated {
                bb_id,
                offset,
                needed,
                available,
            });
        }

        slices.push(SliceIndex {
            spectrum_id: spectrum_id as i64,
            encoding,
            peaks_offset: offset + SLICE_HEADER_SIZE,
            peaks_count,
        });
        offset += needed;
    }

    Ok(BoundingBoxIndex { bb_id, slices })
}

/// Peaks must have been bounds-checked by [`index_slices`]
fn read_peaks<B: byteorder::ByteOrder>(
    bytes: &[u8],
    slice: &SliceIndex,
    mz_range: Option<(f64, f64)>,
) -> PeakBuffer {
    let pe = slice.encoding.peak_encoding;
    let fitted = slice.encoding.mode == DataMode::Fitted;
    let peak_size = slice.encoding.peak_size();
    let mz_size = pe.mz_size();
    let pair_size = pe.pair_size();

    let mut peaks = PeakBuffer::with_capacity(slice.peaks_count, fitted);

    for i in 0..slice.peaks_count {
        let start = slice.peaks_offset + i * peak_size;
        let peak = &bytes[start..start + peak_size];

        let mz = match pe {
            PeakEncoding::LowRes => B::read_f32(&peak[..4]) as f64,
            PeakEncoding::HighRes | PeakEncoding::NoLoss => B::read_f64(&peak[..8]),
        };
        if let Some((min_mz, max_mz)) = mz_range {
            if mz < min_mz || mz > max_mz {
                continue;
            }
        }

        let intensity = match pe {
            PeakEncoding::NoLoss => B::read_f64(&peak[mz_size..pair_size]) as f32,
            PeakEncoding::LowRes | PeakEncoding::HighRes => {
                B::read_f32(&peak[mz_size..pair_size])
            }
        };

        peaks.mz.push(mz);
        peaks.intensity.push(intensity);
        if fitted {
            peaks.left_hwhm.push(B::read_f32(&peak[pair_size..pair_size + 4]));
            peaks.right_hwhm.push(B::read_f32(&peak[pair_size + 4..pair_size + 8]));
        }
    }

    peaks
}
