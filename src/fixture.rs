//! Small mzDB container for tests and benches
//!
//! Layout of the container written by [`write_fixture`]:
//!
//! | spectrum | level | time | cycle | group | peaks |
//! |----------|-------|------|-------|-------|-------|
//! | 1        | 1     | 10.0 | 1     | 1     | 4     |
//! | 2        | 2     | 10.5 | 1     | 2     | 3     |
//! | 3        | 2     | 11.0 | 1     | 2     | 1     |
//! | 4        | 1     | 20.0 | 2     | 1     | 1     |
//! | 5        | 2     | 20.5 | 2     | 5     | 2     |
//! | 6        | 1     | 30.0 | 3     | 6     | 2     |
//!
//! Run slices: 1 = MS1 400-405, 2 = MS1 405-410, 3 = MS2 100-2000.
//! Bounding box 1 (run slice 2) is stored before box 2 (run slice 1), both
//! in group 1. Box 4 has no R-tree row.
//!
//! Fitted encodings store `intensity / 1000` and `intensity / 500` as the
//! left and right HWHM of every peak.
//!
//! Chromatograms: 1 = "TIC" over the MS1 times, 2 = "SRM 402.5 -> 150"
//! with precursor and product and no param tree.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use rusqlite::{params, Connection};

type FixtureResult = Result<(), Box<dyn std::error::Error>>;

/// Knobs for the written container
#[derive(Debug, Clone)]
pub struct FixtureOptions {
    /// Value of `mzdb.version`
    pub version: &'static str,
    /// Value of `data_encoding.compression`
    pub compression: &'static str,
    /// Total number of extra MS1 cycles appended after spectrum 6
    pub extra_cycles: usize,
    /// Value of `data_encoding.mode`
    pub mode: &'static str,
    /// Value of `data_encoding.byte_order`
    pub byte_order: &'static str,
    /// `data_encoding.mz_precision` of encoding 1
    pub mz_precision: i64,
    /// `data_encoding.intensity_precision` of encoding 1
    pub intensity_precision: i64,
    /// Spectra stored with encoding 2 (64/64, otherwise like encoding 1)
    pub no_loss_spectra: &'static [i64],
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            version: "0.7",
            compression: "none",
            extra_cycles: 0,
            mode: "centroid",
            byte_order: "little_endian",
            mz_precision: 64,
            intensity_precision: 32,
            no_loss_spectra: &[],
        }
    }
}

/// Layout of stored numbers for one data encoding
#[derive(Debug, Clone, Copy)]
struct PeakLayout {
    big_endian: bool,
    wide_mz: bool,
    wide_intensity: bool,
    fitted: bool,
}

impl PeakLayout {
    fn new(options: &FixtureOptions, mz_precision: i64, intensity_precision: i64) -> Self {
        Self {
            big_endian: options.byte_order == "big_endian",
            wide_mz: mz_precision == 64,
            wide_intensity: intensity_precision == 64,
            fitted: options.mode == "fitted",
        }
    }

    fn put_i32(&self, blob: &mut Vec<u8>, value: i32) {
        if self.big_endian {
            blob.extend_from_slice(&value.to_be_bytes());
        } else {
            blob.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn put_f32(&self, blob: &mut Vec<u8>, value: f32) {
        if self.big_endian {
            blob.extend_from_slice(&value.to_be_bytes());
        } else {
            blob.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn put_f64(&self, blob: &mut Vec<u8>, value: f64) {
        if self.big_endian {
            blob.extend_from_slice(&value.to_be_bytes());
        } else {
            blob.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// One (m/z or time, intensity) pair
    fn put_pair(&self, blob: &mut Vec<u8>, x: f64, intensity: f32) {
        if self.wide_mz {
            self.put_f64(blob, x);
        } else {
            self.put_f32(blob, x as f32);
        }
        if self.wide_intensity {
            self.put_f64(blob, intensity as f64);
        } else {
            self.put_f32(blob, intensity);
        }
    }

    fn put_peak(&self, blob: &mut Vec<u8>, mz: f64, intensity: f32) {
        self.put_pair(blob, mz, intensity);
        if self.fitted {
            self.put_f32(blob, intensity / 1000.0);
            self.put_f32(blob, intensity / 500.0);
        }
    }
}

const SCHEMA: &str = "
CREATE TABLE mzdb (version TEXT, creation_timestamp TEXT, param_tree TEXT);
CREATE TABLE software (
    id INTEGER PRIMARY KEY, name TEXT, version TEXT, param_tree TEXT, shared_param_tree_id INTEGER);
CREATE TABLE sample (id INTEGER PRIMARY KEY, name TEXT, param_tree TEXT, shared_param_tree_id INTEGER);
CREATE TABLE source_file (
    id INTEGER PRIMARY KEY, name TEXT, location TEXT, param_tree TEXT, shared_param_tree_id INTEGER);
CREATE TABLE instrument_configuration (
    id INTEGER PRIMARY KEY, name TEXT, param_tree TEXT, component_list TEXT,
    shared_param_tree_id INTEGER, software_id INTEGER);
CREATE TABLE cv_term (accession TEXT PRIMARY KEY, name TEXT, unit_accession TEXT, cv_id TEXT);
CREATE TABLE data_encoding (
    id INTEGER PRIMARY KEY, mode TEXT, compression TEXT, byte_order TEXT,
    mz_precision INTEGER, intensity_precision INTEGER, param_tree TEXT);
CREATE TABLE shared_param_tree (id INTEGER PRIMARY KEY, data TEXT, schema_name TEXT);
CREATE TABLE run (
    id INTEGER PRIMARY KEY, name TEXT, start_timestamp TEXT, param_tree TEXT,
    shared_param_tree_id INTEGER, sample_id INTEGER, default_instrument_config_id INTEGER,
    default_source_file_id INTEGER, default_scan_processing_id INTEGER,
    default_chrom_processing_id INTEGER);
CREATE TABLE chromatogram (
    id INTEGER PRIMARY KEY, name TEXT, activation_type TEXT, data_points BLOB, param_tree TEXT,
    precursor TEXT, product TEXT, shared_param_tree_id INTEGER, run_id INTEGER,
    data_processing_id INTEGER, data_encoding_id INTEGER);
CREATE TABLE run_slice (
    id INTEGER PRIMARY KEY, ms_level INTEGER, number INTEGER,
    begin_mz REAL, end_mz REAL, param_tree TEXT, run_id INTEGER);
CREATE TABLE spectrum (
    id INTEGER PRIMARY KEY, initial_id INTEGER, title TEXT, cycle INTEGER, time REAL,
    ms_level INTEGER, activation_type TEXT, tic REAL, base_peak_mz REAL,
    base_peak_intensity REAL, main_precursor_mz REAL, main_precursor_charge INTEGER,
    data_points_count INTEGER, param_tree TEXT, scan_list TEXT, precursor_list TEXT,
    product_list TEXT, shared_param_tree_id INTEGER, instrument_configuration_id INTEGER,
    source_file_id INTEGER, run_id INTEGER, data_processing_id INTEGER,
    data_encoding_id INTEGER, bb_first_spectrum_id INTEGER);
CREATE TABLE bounding_box (
    id INTEGER PRIMARY KEY, data BLOB, run_slice_id INTEGER,
    first_spectrum_id INTEGER, last_spectrum_id INTEGER);
CREATE VIRTUAL TABLE bounding_box_rtree USING rtree(id, min_mz, max_mz, min_time, max_time);
CREATE VIRTUAL TABLE bounding_box_msn_rtree USING rtree(
    id, min_ms_level, max_ms_level, min_parent_mz, max_parent_mz,
    min_mz, max_mz, min_time, max_time);
";

const MZDB_PARAM_TREE: &str = r#"<params><userParams>
<userParam cvRef="MS" accession="" name="ms1_bb_mz_width" value="5" type="xsd:float"/>
<userParam cvRef="MS" accession="" name="msn_bb_mz_width" value="10000" type="xsd:float"/>
<userParam cvRef="MS" accession="" name="ms1_bb_time_width" value="15" type="xsd:float"/>
<userParam cvRef="MS" accession="" name="msn_bb_time_width" value="0" type="xsd:float"/>
<userParam cvRef="MS" accession="" name="is_lossless" value="false" type="xsd:boolean"/>
</userParams></params>"#;

const SPECTRUM_PARAM_TREE: &str = r#"<params><cvParams>
<cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
<cvParam cvRef="MS" accession="MS:1000130" name="positive scan" value=""/>
</cvParams></params>"#;

const SHARED_PARAM_TREE: &str = r#"<params><cvParams>
<cvParam cvRef="MS" accession="MS:1000580" name="MSn spectrum" value=""/>
</cvParams></params>"#;

const RUN_PARAM_TREE: &str = r#"<params><userParams>
<userParam cvRef="MS" accession="" name="acquisition" value="fixture" type="xsd:string"/>
</userParams></params>"#;

const PRECURSOR_XML: &str = r#"<precursor><isolationWindow><cvParams>
<cvParam cvRef="MS" accession="MS:1000827" name="isolation window target m/z" value="402.5"/>
</cvParams></isolationWindow></precursor>"#;

const PRODUCT_XML: &str = r#"<product><isolationWindow><cvParams>
<cvParam cvRef="MS" accession="MS:1000827" name="isolation window target m/z" value="150"/>
</cvParams></isolationWindow></product>"#;

const CHROMATOGRAM_PARAM_TREE: &str = r#"<params><cvParams>
<cvParam cvRef="MS" accession="MS:1000235" name="total ion current chromatogram" value=""/>
</cvParams></params>"#;

struct SpectrumRow {
    id: i64,
    ms_level: i64,
    cycle: i64,
    time: f64,
    peaks_count: i64,
    precursor: Option<(f64, i64)>,
    param_tree: Option<&'static str>,
    shared_param_tree_id: Option<i64>,
    bb_first_spectrum_id: i64,
}

/// Slices of one bounding box: (spectrum id, peaks)
struct BoxRow {
    id: i64,
    run_slice_id: i64,
    first_spectrum_id: i64,
    last_spectrum_id: i64,
    slices: Vec<(i32, Vec<(f64, f32)>)>,
}

/// Write the default container to `path`
pub fn write_fixture(path: &Path) -> FixtureResult {
    write_fixture_with(path, &FixtureOptions::default())
}

/// Write a container with custom options to `path`
pub fn write_fixture_with(path: &Path, options: &FixtureOptions) -> FixtureResult {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    conn.execute(
        "INSERT INTO mzdb (version, creation_timestamp, param_tree) VALUES (?1, ?2, ?3)",
        params![options.version, "2024-01-01 00:00:00", MZDB_PARAM_TREE],
    )?;
    conn.execute_batch(
        "INSERT INTO software (id, name, version) VALUES (1, 'pwiz', '3.0'), (2, 'pwiz-mzDB', '0.9.10');
         INSERT INTO sample VALUES (1, 'HeLa digest', NULL, NULL);
         INSERT INTO source_file VALUES (1, 'run.raw', 'file:///data', NULL, NULL);
         INSERT INTO instrument_configuration VALUES (1, 'IC1', NULL, '<componentList count=\"3\"/>', NULL, 1);
         INSERT INTO cv_term VALUES ('MS:1000511', 'ms level', NULL, 'MS');
         INSERT INTO cv_term VALUES ('MS:1000040', 'm/z', NULL, 'MS');",
    )?;
    conn.execute(
        "INSERT INTO data_encoding VALUES (1, ?1, ?2, ?3, ?4, ?5, NULL)",
        params![
            options.mode,
            options.compression,
            options.byte_order,
            options.mz_precision,
            options.intensity_precision
        ],
    )?;
    if !options.no_loss_spectra.is_empty() {
        conn.execute(
            "INSERT INTO data_encoding VALUES (2, ?1, ?2, ?3, 64, 64, NULL)",
            params![options.mode, options.compression, options.byte_order],
        )?;
    }
    let layout_1 = PeakLayout::new(options, options.mz_precision, options.intensity_precision);
    let layout_2 = PeakLayout::new(options, 64, 64);
    let layout_of = |spectrum_id: i64| {
        if options.no_loss_spectra.contains(&spectrum_id) {
            layout_2
        } else {
            layout_1
        }
    };
    conn.execute(
        "INSERT INTO shared_param_tree VALUES (1, ?1, 'spectrum_params')",
        [SHARED_PARAM_TREE],
    )?;
    conn.execute(
        "INSERT INTO run VALUES (1, 'run', '2024-01-01T00:00:00Z', ?1, NULL, 1, 1, 1, 1, 1)",
        [RUN_PARAM_TREE],
    )?;

    let chromatograms: [(i64, &str, Option<&str>, Option<&str>, Vec<(f64, f32)>); 2] = [
        (
            1,
            "TIC",
            None,
            Some(CHROMATOGRAM_PARAM_TREE),
            vec![(10.0, 1000.0), (20.0, 4000.0), (30.0, 6000.0)],
        ),
        (
            2,
            "SRM 402.5 -> 150",
            Some("CID"),
            None,
            vec![(10.5, 5.0), (20.5, 9.0)],
        ),
    ];
    for (id, name, activation, param_tree, points) in &chromatograms {
        let mut blob = Vec::new();
        for (time, intensity) in points {
            layout_1.put_pair(&mut blob, *time, *intensity);
        }
        let (precursor, product) = match activation {
            Some(_) => (Some(PRECURSOR_XML), Some(PRODUCT_XML)),
            None => (None, None),
        };
        conn.execute(
            "INSERT INTO chromatogram VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 1, 1, 1)",
            params![
                id,
                name,
                activation,
                compress(blob, options)?,
                param_tree,
                precursor,
                product
            ],
        )?;
    }
    conn.execute_batch(
        "INSERT INTO run_slice VALUES (1, 1, 1, 400.0, 405.0, NULL, 1);
         INSERT INTO run_slice VALUES (2, 1, 2, 405.0, 410.0, NULL, 1);
         INSERT INTO run_slice VALUES (3, 2, 1, 100.0, 2000.0, NULL, 1);",
    )?;

    let (spectra, boxes) = layout(options.extra_cycles);

    for s in &spectra {
        conn.execute(
            "INSERT INTO spectrum VALUES (?1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, \
             ?13, NULL, NULL, NULL, ?14, 1, 1, 1, 1, ?16, ?15)",
            params![
                s.id,
                format!("scan={}", s.id),
                s.cycle,
                s.time,
                s.ms_level,
                s.precursor.map(|_| "HCD"),
                1000.0 * s.id as f64,
                400.0,
                100.0,
                s.precursor.map(|(mz, _)| mz),
                s.precursor.map(|(_, z)| z),
                s.peaks_count,
                s.param_tree,
                s.shared_param_tree_id,
                s.bb_first_spectrum_id,
                if options.no_loss_spectra.contains(&s.id) { 2 } else { 1 },
            ],
        )?;
    }

    let time_of = |id: i64| {
        spectra
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.time)
            .unwrap_or_default()
    };

    for bb in &boxes {
        // Slice headers follow the box's first spectrum
        let header_layout = layout_of(bb.first_spectrum_id);
        let mut blob = Vec::new();
        for (spectrum_id, peaks) in &bb.slices {
            header_layout.put_i32(&mut blob, *spectrum_id);
            header_layout.put_i32(&mut blob, peaks.len() as i32);
            let layout = layout_of(*spectrum_id as i64);
            for (mz, intensity) in peaks {
                layout.put_peak(&mut blob, *mz, *intensity);
            }
        }
        let blob = compress(blob, options)?;

        conn.execute(
            "INSERT INTO bounding_box VALUES (?1, ?2, ?3, ?4, ?5)",
            params![bb.id, blob, bb.run_slice_id, bb.first_spectrum_id, bb.last_spectrum_id],
        )?;

        let min_mz = bb
            .slices
            .iter()
            .flat_map(|(_, peaks)| peaks.iter().map(|p| p.0))
            .fold(f64::MAX, f64::min);
        let max_mz = bb
            .slices
            .iter()
            .flat_map(|(_, peaks)| peaks.iter().map(|p| p.0))
            .fold(f64::MIN, f64::max);
        let (min_time, max_time) = (time_of(bb.first_spectrum_id), time_of(bb.last_spectrum_id));

        match bb.run_slice_id {
            // Box 4 is left out of the R-tree
            1 | 2 if bb.id != 4 => {
                conn.execute(
                    "INSERT INTO bounding_box_rtree VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![bb.id, min_mz, max_mz, min_time, max_time],
                )?;
            }
            3 => {
                conn.execute(
                    "INSERT INTO bounding_box_msn_rtree VALUES (?1, 2, 2, 100.0, 2000.0, ?2, ?3, ?4, ?5)",
                    params![bb.id, min_mz, max_mz, min_time, max_time],
                )?;
            }
            _ => {}
        }
    }

    Ok(())
}

fn compress(blob: Vec<u8>, options: &FixtureOptions) -> Result<Vec<u8>, std::io::Error> {
    if options.compression != "zlib" {
        return Ok(blob);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&blob)?;
    encoder.finish()
}

fn layout(extra_cycles: usize) -> (Vec<SpectrumRow>, Vec<BoxRow>) {
    let ms1 = |id, cycle, time, peaks_count, group| SpectrumRow {
        id,
        ms_level: 1,
        cycle,
        time,
        peaks_count,
        precursor: None,
        param_tree: None,
        shared_param_tree_id: None,
        bb_first_spectrum_id: group,
    };
    let ms2 = |id, cycle, time, peaks_count, group, precursor| SpectrumRow {
        id,
        ms_level: 2,
        cycle,
        time,
        peaks_count,
        precursor: Some(precursor),
        param_tree: None,
        shared_param_tree_id: None,
        bb_first_spectrum_id: group,
    };

    let mut first = ms1(1, 1, 10.0, 4, 1);
    first.param_tree = Some(SPECTRUM_PARAM_TREE);
    let mut second = ms2(2, 1, 10.5, 3, 2, (402.5, 2));
    second.shared_param_tree_id = Some(1);

    let mut spectra = vec![
        first,
        second,
        ms2(3, 1, 11.0, 1, 2, (407.25, 3)),
        ms1(4, 2, 20.0, 1, 1),
        ms2(5, 2, 20.5, 2, 5, (403.0, 2)),
        ms1(6, 3, 30.0, 2, 6),
    ];

    let mut boxes = vec![
        BoxRow {
            id: 1,
            run_slice_id: 2,
            first_spectrum_id: 1,
            last_spectrum_id: 4,
            slices: vec![(1, vec![(405.5, 300.0), (409.0, 400.0)]), (4, vec![])],
        },
        BoxRow {
            id: 2,
            run_slice_id: 1,
            first_spectrum_id: 1,
            last_spectrum_id: 4,
            slices: vec![
                (1, vec![(400.5, 100.0), (401.5, 200.0)]),
                (4, vec![(402.0, 50.0)]),
            ],
        },
        BoxRow {
            id: 3,
            run_slice_id: 1,
            first_spectrum_id: 6,
            last_spectrum_id: 6,
            slices: vec![(6, vec![(403.0, 10.0)])],
        },
        BoxRow {
            id: 4,
            run_slice_id: 2,
            first_spectrum_id: 6,
            last_spectrum_id: 6,
            slices: vec![(6, vec![(406.0, 20.0)])],
        },
        BoxRow {
            id: 5,
            run_slice_id: 3,
            first_spectrum_id: 2,
            last_spectrum_id: 3,
            slices: vec![
                (2, vec![(150.0, 5.0), (300.0, 6.0), (450.0, 7.0)]),
                (3, vec![(200.0, 8.0)]),
            ],
        },
        BoxRow {
            id: 6,
            run_slice_id: 3,
            first_spectrum_id: 5,
            last_spectrum_id: 5,
            slices: vec![(5, vec![(250.0, 9.0), (500.0, 10.0)])],
        },
    ];

    // One MS1 spectrum per extra cycle, each in its own pair of boxes
    for i in 0..extra_cycles {
        let id = 7 + i as i64;
        let time = 40.0 + 10.0 * i as f64;
        spectra.push(ms1(id, 4 + i as i64, time, 20, id));

        let peaks = |start: f64| -> Vec<(f64, f32)> {
            (0..10)
                .map(|k| (start + 0.4 * k as f64, 10.0 + k as f32))
                .collect()
        };
        for (offset, run_slice_id, start) in [(0, 1, 400.25), (1, 2, 405.25)] {
            boxes.push(BoxRow {
                id: 7 + 2 * i as i64 + offset,
                run_slice_id,
                first_spectrum_id: id,
                last_spectrum_id: id,
                slices: vec![(id as i32, peaks(start))],
            });
        }
    }

    (spectra, boxes)
}
