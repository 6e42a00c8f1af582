//! # mzDB Store Module
//!
//! Read-only access to mzDB containers.
//!
//! An mzDB file is an SQLite database. Opening a [`MzdbStore`] loads the small
//! index tables (data encodings, spectrum headers, run slices and bounding
//! box descriptors) into memory; peak blobs are read and decoded on demand.
//!
//! ## Features
//!
//! - **Random Access**: Decode one spectrum by id, optionally for an m/z window
//! - **Streaming Iteration**: Walk all spectra of an MS level one bounding box
//!   group at a time
//! - **Region Queries**: Find bounding boxes by m/z, retention time and MS level
//! - **Chromatograms**: TIC and SRM traces decoded from their point blobs
//! - **Metadata Access**: Param trees, runs, samples, software, CV terms,
//!   versions and file summary
//!
//! ## Example
//!
//! ```rust,no_run
//! use mzdb::store::{MzdbStore, ParamTreeScope};
//!
//! let store = MzdbStore::open("run.mzDB")?;
//! println!("mzDB version: {}", store.get_mzdb_version()?);
//!
//! let data = store.get_spectrum_data(1)?;
//! println!("Spectrum 1: {} peaks", data.peaks_count());
//!
//! for item in store.iter_spectrum_data(Some(1))? {
//!     let (index, spectrum) = item?;
//!     println!("#{} id={} rt={:.2}", index, spectrum.header.id, spectrum.header.time);
//! }
//!
//! let tree = store.get_param_tree(ParamTreeScope::Mzdb)?;
//! println!("{} user params", tree.user_params.len());
//!
//! store.close();
//! # Ok::<(), mzdb::store::MzdbError>(())
//! ```

mod bounding_boxes;
mod chromatograms;
mod config;
mod error;
mod index;
mod iter;
mod metadata;
mod open;
mod param_trees;
mod spectra;
mod summary;


use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

pub use config::StoreConfig;
pub use error::{MzdbError, OpenError};
pub use iter::SpectrumDataIter;
pub use param_trees::ParamTreeScope;
pub use summary::FileSummary;

use index::StoreIndex;

/// Reader for mzDB files
///
/// The connection sits behind a lock and the index is immutable after open,
/// so a store can be shared between threads. Queries that read blobs or
/// optional tables serialize on the lock; queries answered from the index
/// only check the closed flag.
pub struct MzdbStore {
    path: PathBuf,
    config: StoreConfig,
    conn: Mutex<Option<Connection>>,
    closed: AtomicBool,
    index: StoreIndex,
}

impl MzdbStore {
    /// Path the store was opened from
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Settings the store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Release the connection. Closing twice is a no-op.
    pub fn close(&self) {
        let mut guard = self.lock();
        self.closed.store(true, Ordering::Release);
        if guard.take().is_some() {
            log::info!("Closed {}", self.path.display());
        }
    }

    /// True once [`MzdbStore::close`] was called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// A poisoned lock still holds a usable connection, every query is read-only
    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the open connection
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, MzdbError>,
    ) -> Result<T, MzdbError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(MzdbError::Closed)?;
        f(conn)
    }

    /// Access the in-memory index, failing once the store is closed
    fn index(&self) -> Result<&StoreIndex, MzdbError> {
        if self.is_closed() {
            return Err(MzdbError::Closed);
        }
        Ok(&self.index)
    }
}
