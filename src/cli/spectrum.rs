use anyhow::{Context, Result};

use mzdb::store::MzdbStore;

/// Print the header and peaks of one spectrum
pub fn run(
    store: &MzdbStore,
    id: i64,
    mz_window: Option<(f64, f64)>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let header = store
        .get_spectrum_header(id)
        .with_context(|| format!("Failed to read spectrum {}", id))?;
    let data = match mz_window {
        Some((min_mz, max_mz)) => store.get_spectrum_data_in_mz_range(id, min_mz, max_mz),
        None => store.get_spectrum_data(id),
    }
    .with_context(|| format!("Failed to decode spectrum {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&header.to_json())?);
    } else {
        println!("Spectrum {} ({})", header.id, header.title);
        println!("  MS level: {}", header.ms_level);
        println!("  RT: {:.4} sec, cycle {}", header.time, header.cycle);
        if let Some(precursor_mz) = header.precursor_mz {
            let charge = header
                .precursor_charge
                .map(|z| format!("{}+", z))
                .unwrap_or_else(|| "?".to_string());
            println!("  Precursor: {:.4} ({})", precursor_mz, charge);
        }
        println!("  Data encoding: {} ({})", data.data_encoding.id, data.data_encoding.mode);
        println!("  Peaks: {}", data.peaks_count());
    }
    println!();

    println!("{:>14}\t{:>14}", "m/z", "intensity");
    for (mz, intensity) in data.peaks().take(limit.unwrap_or(usize::MAX)) {
        println!("{:>14.6}\t{:>14.2}", mz, intensity);
    }

    Ok(())
}
