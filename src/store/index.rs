use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension};

use super::MzdbError;
use crate::model::{
    BoundingBox, BoundingBoxSizes, DataEncoding, DataEncodingRow, DataEncodingTable, RunSlice,
    SpectrumHeader,
};
use crate::param_tree::ParamTree;

/// Tables every container must have
pub(super) const REQUIRED_TABLES: [&str; 5] =
    ["mzdb", "data_encoding", "spectrum", "run_slice", "bounding_box"];

/// (min_mz, max_mz, min_time, max_time) keyed by bounding box id
type RtreeRanges = HashMap<i64, (f64, f64, f64, f64)>;

/// In-memory copy of the index tables, immutable after open
#[derive(Debug)]
pub(super) struct StoreIndex {
    pub version: String,
    pub writer_version: Option<String>,
    pub encodings: DataEncodingTable,
    /// Sorted by id
    pub headers: Vec<SpectrumHeader>,
    /// Sorted by id
    pub run_slices: Vec<RunSlice>,
    /// Sorted by id
    pub bounding_boxes: Vec<BoundingBox>,
    pub bb_sizes: BoundingBoxSizes,
}

impl StoreIndex {
    pub fn load(conn: &Connection, version: String) -> rusqlite::Result<Self> {
        let encodings = DataEncodingTable::from_rows(load_data_encodings(conn)?);
        let headers = load_headers(conn)?;
        let run_slices = load_run_slices(conn)?;
        let bounding_boxes = load_bounding_boxes(conn, &headers, &run_slices)?;
        let writer_version = load_writer_version(conn)?;
        let bb_sizes = load_bb_sizes(conn)?;

        log::debug!(
            "Loaded index: {} data encodings, {} spectra, {} run slices, {} bounding boxes",
            encodings.len(),
            headers.len(),
            run_slices.len(),
            bounding_boxes.len()
        );

        Ok(Self {
            version,
            writer_version,
            encodings,
            headers,
            run_slices,
            bounding_boxes,
            bb_sizes,
        })
    }

    pub fn header(&self, id: i64) -> Option<&SpectrumHeader> {
        find_by_id(&self.headers, id, |h| h.id)
    }

    pub fn bounding_box(&self, id: i64) -> Option<&BoundingBox> {
        find_by_id(&self.bounding_boxes, id, |b| b.id)
    }

    pub fn run_slice(&self, id: i64) -> Option<&RunSlice> {
        find_by_id(&self.run_slices, id, |r| r.id)
    }

    /// A usable data encoding; unsupported rows report their decode error
    pub fn encoding(&self, id: i64) -> Result<&DataEncoding, MzdbError> {
        let encoding = self
            .encodings
            .get(id)
            .ok_or_else(|| MzdbError::not_found("data encoding", id))??;
        Ok(encoding)
    }
}

fn find_by_id<T>(items: &[T], id: i64, key: impl Fn(&T) -> i64) -> Option<&T> {
    items
        .binary_search_by_key(&id, key)
        .ok()
        .map(|i| &items[i])
}

pub(super) fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn load_data_encodings(conn: &Connection) -> rusqlite::Result<Vec<DataEncodingRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, mode, compression, byte_order, mz_precision, intensity_precision \
         FROM data_encoding ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DataEncodingRow {
            id: row.get(0)?,
            mode: row.get(1)?,
            compression: row.get(2)?,
            byte_order: row.get(3)?,
            mz_precision: row.get(4)?,
            intensity_precision: row.get(5)?,
        })
    })?;
    rows.collect()
}

fn load_headers(conn: &Connection) -> rusqlite::Result<Vec<SpectrumHeader>> {
    let sql = format!(
        "SELECT {} FROM spectrum ORDER BY id",
        SpectrumHeader::SQL_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], SpectrumHeader::from_row)?;
    rows.collect()
}

fn load_run_slices(conn: &Connection) -> rusqlite::Result<Vec<RunSlice>> {
    let mut stmt = conn.prepare(
        "SELECT id, ms_level, number, begin_mz, end_mz, run_id FROM run_slice ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(RunSlice {
            id: row.get(0)?,
            ms_level: row.get(1)?,
            number: row.get(2)?,
            begin_mz: row.get(3)?,
            end_mz: row.get(4)?,
            run_id: row.get(5)?,
        })
    })?;
    rows.collect()
}

fn load_rtree(conn: &Connection, table: &str) -> rusqlite::Result<RtreeRanges> {
    if !table_exists(conn, table)? {
        log::debug!("No {} table", table);
        return Ok(RtreeRanges::new());
    }

    let sql = format!("SELECT id, min_mz, max_mz, min_time, max_time FROM {}", table);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            (
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
            ),
        ))
    })?;
    rows.collect()
}

fn load_bounding_boxes(
    conn: &Connection,
    headers: &[SpectrumHeader],
    run_slices: &[RunSlice],
) -> rusqlite::Result<Vec<BoundingBox>> {
    let ms1_ranges = load_rtree(conn, "bounding_box_rtree")?;
    let msn_ranges = load_rtree(conn, "bounding_box_msn_rtree")?;

    let time_of = |spectrum_id: i64| {
        find_by_id(headers, spectrum_id, |h| h.id)
            .map(|h| h.time as f64)
            .unwrap_or_default()
    };

    let mut stmt = conn.prepare(
        "SELECT id, run_slice_id, first_spectrum_id, last_spectrum_id, length(data) \
         FROM bounding_box ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, Option<i64>>(4)?,
        ))
    })?;

    let mut boxes = Vec::new();
    let mut fallbacks = 0usize;
    for row in rows {
        let (id, run_slice_id, first_spectrum_id, last_spectrum_id, data_size) = row?;

        let run_slice = find_by_id(run_slices, run_slice_id, |r| r.id);
        let ms_level = match run_slice {
            Some(rs) => rs.ms_level,
            None => find_by_id(headers, first_spectrum_id, |h| h.id)
                .map(|h| h.ms_level)
                .unwrap_or(1),
        };

        let ranges = if ms_level == 1 { &ms1_ranges } else { &msn_ranges };
        let (min_mz, max_mz, min_time, max_time) = match ranges.get(&id) {
            Some(&range) => range,
            None => {
                fallbacks += 1;
                let (begin_mz, end_mz) = run_slice
                    .map(|rs| (rs.begin_mz, rs.end_mz))
                    .unwrap_or_default();
                (begin_mz, end_mz, time_of(first_spectrum_id), time_of(last_spectrum_id))
            }
        };

        boxes.push(BoundingBox {
            id,
            run_slice_id,
            first_spectrum_id,
            last_spectrum_id,
            ms_level,
            min_mz,
            max_mz,
            min_time,
            max_time,
            data_size: data_size.unwrap_or_default().max(0) as usize,
        });
    }

    if fallbacks > 0 {
        log::debug!(
            "{} bounding boxes have no R-tree entry, using run slice and spectrum ranges",
            fallbacks
        );
    }
    Ok(boxes)
}

fn load_writer_version(conn: &Connection) -> rusqlite::Result<Option<String>> {
    if !table_exists(conn, "software")? {
        return Ok(None);
    }
    conn.query_row(
        "SELECT version FROM software WHERE name LIKE '%mzDB' LIMIT 1",
        [],
        |row| row.get(0),
    )
    .optional()
    .map(Option::flatten)
}

fn load_bb_sizes(conn: &Connection) -> rusqlite::Result<BoundingBoxSizes> {
    let xml: Option<String> = conn
        .query_row("SELECT param_tree FROM mzdb LIMIT 1", [], |row| row.get(0))
        .optional()?
        .flatten();

    let Some(xml) = xml else {
        return Ok(BoundingBoxSizes::default());
    };
    match ParamTree::parse(&xml) {
        Ok(tree) => Ok(BoundingBoxSizes::from_param_tree(&tree)),
        Err(e) => {
            log::warn!("Cannot read bounding box sizes from mzdb param tree: {}", e);
            Ok(BoundingBoxSizes::default())
        }
    }
}
