use anyhow::{Context, Result};

use mzdb::store::MzdbStore;

/// List the chromatograms, or print the points of one
pub fn run(store: &MzdbStore, id: Option<i64>, limit: Option<usize>) -> Result<()> {
    let Some(id) = id else {
        let headers = store.list_chromatograms()?;
        println!("{:>6} {:>6} {:<10} {}", "id", "run", "activation", "name");
        for header in &headers {
            println!(
                "{:>6} {:>6} {:<10} {}",
                header.id,
                header.run_id,
                header.activation_type.as_deref().unwrap_or("-"),
                header.name
            );
        }
        println!("{} chromatograms", headers.len());
        return Ok(());
    };

    let chromatogram = store
        .get_chromatogram(id)
        .with_context(|| format!("Failed to read chromatogram {}", id))?;
    let data = &chromatogram.data;
    println!("Chromatogram {} ({})", id, chromatogram.header.name);
    println!("Points: {}", data.points_count());
    println!("Total intensity: {:.1}", data.total_intensity());
    if let Some((time, intensity)) = data.max_intensity_point() {
        println!("Apex: {:.2} s, {:.1}", time, intensity);
    }

    let shown = limit.unwrap_or(usize::MAX);
    for (time, intensity) in data.time_list.iter().zip(&data.intensity_list).take(shown) {
        println!("{:.4}\t{:.1}", time, intensity);
    }
    if data.points_count() > shown {
        println!("... {} more", data.points_count() - shown);
    }

    Ok(())
}
