use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use mzdb::store::MzdbStore;

/// Decode every spectrum in order and print one line per spectrum
pub fn run(store: &MzdbStore, ms_level: Option<u8>, limit: Option<usize>) -> Result<()> {
    let start = Instant::now();
    let mut total_peaks = 0usize;
    let mut count = 0usize;

    println!(
        "{:>6} {:>8} {:>3} {:>10} {:>8} {:>14}",
        "index", "id", "ms", "rt", "peaks", "base peak m/z"
    );
    for item in store.iter_spectrum_data(ms_level)?.take(limit.unwrap_or(usize::MAX)) {
        let (index, spectrum) = item.context("Failed to decode spectrum")?;
        println!(
            "{:>6} {:>8} {:>3} {:>10.2} {:>8} {:>14.4}",
            index,
            spectrum.header.id,
            spectrum.header.ms_level,
            spectrum.header.time,
            spectrum.data.peaks_count(),
            spectrum.header.base_peak_mz
        );
        total_peaks += spectrum.data.peaks_count();
        count += 1;
    }

    let elapsed = start.elapsed();
    info!(
        "Decoded {} spectra ({} peaks) in {:.2?}",
        count, total_peaks, elapsed
    );
    Ok(())
}
