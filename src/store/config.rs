use serde::{Deserialize, Serialize};

/// Connection settings for an [`MzdbStore`](super::MzdbStore)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite page cache size in KiB
    pub cache_size_kib: u64,
    /// Memory-mapped I/O size in bytes (0 disables mmap)
    pub mmap_size: u64,
    /// Reject containers outside the supported version range instead of warning
    pub strict_version: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_size_kib: 16 * 1024,
            mmap_size: 0,
            strict_version: true,
        }
    }
}
