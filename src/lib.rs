//! # mzdb - Read-only access to mzDB files
//!
//! `mzdb` reads mzDB containers: SQLite databases that store mass
//! spectrometry runs as a relational index (spectra, run slices, bounding
//! boxes) plus binary peak blobs and XML param trees.
//!
//! ## Key Features
//!
//! - **Indexed Access**: Spectrum headers, bounding boxes, run slices and data
//!   encodings are loaded once at open and answered from memory.
//!
//! - **On-demand Decoding**: Peaks are decoded from bounding box blobs only
//!   when a spectrum is requested, in any of the stored precisions
//!   (32/32, 64/32, 64/64), byte orders and zlib compression.
//!
//! - **Streaming Iteration**: [`store::SpectrumDataIter`] walks a run one
//!   bounding box group at a time.
//!
//! - **Chromatograms**: TIC and SRM traces with their points.
//!
//! - **Param Trees**: mzDB XML metadata parsed into CV params, user params
//!   and user texts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mzdb::prelude::*;
//!
//! let store = MzdbStore::open("run.mzDB")?;
//! println!("{}", store.summary()?);
//!
//! let spectrum = store.get_spectrum(1)?;
//! for (mz, intensity) in spectrum.data.peaks().take(5) {
//!     println!("{:.4}\t{:.1}", mz, intensity);
//! }
//!
//! store.close();
//! # Ok::<(), mzdb::store::MzdbError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`store`]: [`store::MzdbStore`], the open/close lifecycle and all queries
//! - [`model`]: Owned records returned by the store
//! - [`codec`]: Bounding box blob layout and peak decoding
//! - [`param_tree`]: XML param tree parsing
//!
//! ## Container Layout
//!
//! | Table | Content |
//! |-------|---------|
//! | mzdb | Schema version and container-level param tree |
//! | data_encoding | Mode, precision, compression and byte order of peak blobs |
//! | spectrum | One row per spectrum (header fields, param tree) |
//! | run_slice | m/z partitions of the run per MS level |
//! | bounding_box | Peak blobs, one per run slice and RT window |
//! | bounding_box_rtree | MS1 bounding box m/z and RT ranges |
//! | bounding_box_msn_rtree | MSn bounding box ranges |
//! | chromatogram | TIC/SRM traces as (time, intensity) blobs |
//! | run, sample, software, ... | Descriptive metadata |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
// Allow some patterns common in scientific code
#![allow(clippy::too_many_arguments)]

pub mod codec;
pub mod model;
pub mod param_tree;
pub mod store;

#[cfg(test)]
mod fixture;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::codec::DecodeError;
    pub use crate::model::{
        BoundingBox, BoundingBoxSizes, Chromatogram, ChromatogramData, ChromatogramHeader,
        DataEncoding, DataMode, PeakEncoding, Run, RunSlice, Spectrum, SpectrumData,
        SpectrumHeader,
    };
    pub use crate::param_tree::{CvParam, ParamTree, UserParam, UserText};
    pub use crate::store::{
        FileSummary, MzdbError, MzdbStore, OpenError, ParamTreeScope, SpectrumDataIter,
        StoreConfig,
    };
}
