use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use super::index::{table_exists, StoreIndex, REQUIRED_TABLES};
use super::{MzdbStore, OpenError, StoreConfig};

/// First 16 bytes of every SQLite 3 database
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Oldest supported minor version of the 0.x schema
const MIN_MINOR_VERSION: u32 = 6;

impl MzdbStore {
    /// Open an mzDB file with the default configuration
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenError> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open an mzDB file with custom configuration
    ///
    /// The file is opened read-only. Its index tables are loaded before this
    /// returns; no peak data is decoded.
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: StoreConfig,
    ) -> Result<Self, OpenError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpenError::FileNotFound(path.to_path_buf()));
        }
        check_sqlite_header(path)?;

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        // Negative cache_size is in KiB
        conn.pragma_update(None, "cache_size", -(config.cache_size_kib as i64))?;
        if config.mmap_size > 0 {
            let mmap_size: i64 = conn.pragma_update_and_check(
                None,
                "mmap_size",
                config.mmap_size as i64,
                |row| row.get(0),
            )?;
            log::debug!("mmap_size set to {} bytes", mmap_size);
        }

        for table in REQUIRED_TABLES {
            if !table_exists(&conn, table)? {
                return Err(OpenError::MissingTable(table.to_string()));
            }
        }

        let version: String = conn
            .query_row("SELECT version FROM mzdb LIMIT 1", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?
            .flatten()
            .ok_or(OpenError::MissingVersion)?;
        check_version(&version, config.strict_version)?;

        let index = StoreIndex::load(&conn, version)?;
        log::info!(
            "Opened {} (mzDB {}, {} spectra)",
            path.display(),
            index.version,
            index.headers.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            config,
            conn: Mutex::new(Some(conn)),
            closed: AtomicBool::new(false),
            index,
        })
    }
}

fn check_sqlite_header(path: &Path) -> Result<(), OpenError> {
    let mut header = [0u8; 16];
    let mut file = File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) if &header == SQLITE_HEADER => Ok(()),
        Ok(()) => Err(OpenError::NotSqlite(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(OpenError::NotSqlite(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse `major.minor[.patch]`
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

fn check_version(version: &str, strict: bool) -> Result<(), OpenError> {
    let supported = matches!(
        parse_version(version),
        Some((0, minor)) if minor >= MIN_MINOR_VERSION
    );
    if supported {
        return Ok(());
    }
    if strict {
        return Err(OpenError::UnsupportedVersion(version.to_string()));
    }
    log::warn!(
        "mzDB version {} is outside the supported range (0.{}+), reading anyway",
        version,
        MIN_MINOR_VERSION
    );
    Ok(())
}
