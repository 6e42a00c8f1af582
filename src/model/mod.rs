//! # mzDB data model
//!
//! Owned records returned by [`MzdbStore`](crate::store::MzdbStore). All of
//! them are independent copies and stay valid after the store is closed.

mod bounding_box;
mod chromatogram;
mod encoding;
mod header;
mod metadata;
mod spectrum;

pub use bounding_box::{BoundingBox, BoundingBoxSizes, RunSlice};
pub use chromatogram::{Chromatogram, ChromatogramData, ChromatogramHeader};
pub use encoding::{ByteOrder, Compression, DataEncoding, DataEncodingTable, DataMode, PeakEncoding};
pub use header::SpectrumHeader;
pub use metadata::{
    CvTerm, InstrumentConfiguration, Run, Sample, SharedParamTree, Software, SourceFile,
};
pub use spectrum::{Spectrum, SpectrumData};

pub(crate) use encoding::DataEncodingRow;
pub(crate) use metadata::MetadataRecord;
