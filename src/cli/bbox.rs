use anyhow::{Context, Result};

use mzdb::model::BoundingBox;
use mzdb::store::MzdbStore;

/// Show one bounding box, or every box intersecting a region
pub fn run(
    store: &MzdbStore,
    id: Option<i64>,
    mz_window: Option<(f64, f64)>,
    time_window: Option<(f64, f64)>,
    ms_level: u8,
) -> Result<()> {
    let boxes = match id {
        Some(id) => vec![store
            .get_bounding_box(id)
            .with_context(|| format!("Failed to read bounding box {}", id))?],
        None => {
            let mz_window = mz_window.unwrap_or((f64::MIN, f64::MAX));
            let time_window = time_window.unwrap_or((f64::MIN, f64::MAX));
            store.bounding_boxes_in_region(mz_window, time_window, ms_level)?
        }
    };

    println!(
        "{:>6} {:>5} {:>9} {:>9} {:>3} {:>12} {:>12} {:>10} {:>10} {:>8}",
        "id", "slice", "first", "last", "ms", "min m/z", "max m/z", "min rt", "max rt", "bytes"
    );
    for bb in &boxes {
        print_box(bb);
    }
    println!("{} bounding boxes", boxes.len());

    Ok(())
}

fn print_box(bb: &BoundingBox) {
    println!(
        "{:>6} {:>5} {:>9} {:>9} {:>3} {:>12.4} {:>12.4} {:>10.2} {:>10.2} {:>8}",
        bb.id,
        bb.run_slice_id,
        bb.first_spectrum_id,
        bb.last_spectrum_id,
        bb.ms_level,
        bb.min_mz,
        bb.max_mz,
        bb.min_time,
        bb.max_time,
        bb.data_size
    );
}
