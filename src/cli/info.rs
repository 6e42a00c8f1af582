use anyhow::{Context, Result};
use std::collections::BTreeSet;

use mzdb::store::MzdbStore;

/// Display information about an mzDB file
pub fn run(store: &MzdbStore) -> Result<()> {
    let summary = store.summary().context("Failed to summarize file")?;

    println!("File: {}", store.path().display());
    println!();
    print!("{}", summary);
    println!();

    println!("Data Encodings:");
    let used: BTreeSet<i64> = store
        .spectrum_headers()?
        .iter()
        .map(|h| h.data_encoding_id)
        .collect();
    for id in used {
        match store.get_data_encoding(id) {
            Ok(de) => println!(
                "  {:3}. {} {:?} {:?} {:?}",
                de.id, de.mode, de.peak_encoding, de.compression, de.byte_order
            ),
            Err(e) => println!("  {:3}. {}", id, e),
        }
    }
    println!();

    println!("Run Slices:");
    for rs in store.run_slices(None)? {
        println!(
            "  {:4}. MS{} #{:<4} {:.4} - {:.4}",
            rs.id, rs.ms_level, rs.number, rs.begin_mz, rs.end_mz
        );
    }

    Ok(())
}
