//! Records of the descriptive mzDB tables
//!
//! These tables are optional in practice; a container written without one
//! simply has no records of that kind. Text columns may be NULL.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A table of descriptive records with a fixed column list
pub(crate) trait MetadataRecord: Sized {
    /// Table name
    const TABLE: &'static str;
    /// Columns in the order [`MetadataRecord::from_row`] reads them
    const COLUMNS: &'static str;
    /// Column used by single-record lookups
    const KEY: &'static str = "id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// One acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run id
    pub id: i64,
    /// Run name
    pub name: String,
    /// ISO-8601 start time
    pub start_timestamp: Option<String>,
    /// Param tree XML
    pub param_tree: Option<String>,
    /// Shared param tree id
    pub shared_param_tree_id: Option<i64>,
    /// Sample id
    pub sample_id: Option<i64>,
    /// Default instrument configuration id
    pub default_instrument_config_id: Option<i64>,
    /// Default source file id
    pub default_source_file_id: Option<i64>,
    /// Default scan processing id
    pub default_scan_processing_id: Option<i64>,
    /// Default chromatogram processing id
    pub default_chrom_processing_id: Option<i64>,
}

impl MetadataRecord for Run {
    const TABLE: &'static str = "run";
    const COLUMNS: &'static str = "id, name, start_timestamp, param_tree, shared_param_tree_id, \
         sample_id, default_instrument_config_id, default_source_file_id, \
         default_scan_processing_id, default_chrom_processing_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            start_timestamp: row.get(2)?,
            param_tree: row.get(3)?,
            shared_param_tree_id: row.get(4)?,
            sample_id: row.get(5)?,
            default_instrument_config_id: row.get(6)?,
            default_source_file_id: row.get(7)?,
            default_scan_processing_id: row.get(8)?,
            default_chrom_processing_id: row.get(9)?,
        })
    }
}

/// The sample a run was acquired from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample id
    pub id: i64,
    /// Sample name
    pub name: String,
    /// Param tree XML
    pub param_tree: Option<String>,
    /// Shared param tree id
    pub shared_param_tree_id: Option<i64>,
}

impl MetadataRecord for Sample {
    const TABLE: &'static str = "sample";
    const COLUMNS: &'static str = "id, name, param_tree, shared_param_tree_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            param_tree: row.get(2)?,
            shared_param_tree_id: row.get(3)?,
        })
    }
}

/// Software involved in producing the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Software {
    /// Software id
    pub id: i64,
    /// Name (e.g., "pwiz-mzDB")
    pub name: String,
    /// Version string
    pub version: Option<String>,
    /// Param tree XML
    pub param_tree: Option<String>,
    /// Shared param tree id
    pub shared_param_tree_id: Option<i64>,
}

impl MetadataRecord for Software {
    const TABLE: &'static str = "software";
    const COLUMNS: &'static str = "id, name, version, param_tree, shared_param_tree_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            version: row.get(2)?,
            param_tree: row.get(3)?,
            shared_param_tree_id: row.get(4)?,
        })
    }
}

/// A hardware configuration of the instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfiguration {
    /// Configuration id
    pub id: i64,
    /// Configuration name
    pub name: String,
    /// Param tree XML
    pub param_tree: Option<String>,
    /// Component list XML
    pub component_list: Option<String>,
    /// Shared param tree id
    pub shared_param_tree_id: Option<i64>,
    /// Software used with this configuration
    pub software_id: Option<i64>,
}

impl MetadataRecord for InstrumentConfiguration {
    const TABLE: &'static str = "instrument_configuration";
    const COLUMNS: &'static str =
        "id, name, param_tree, component_list, shared_param_tree_id, software_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            param_tree: row.get(2)?,
            component_list: row.get(3)?,
            shared_param_tree_id: row.get(4)?,
            software_id: row.get(5)?,
        })
    }
}

/// A file the container was converted from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Source file id
    pub id: i64,
    /// File name without directory
    pub name: String,
    /// URI of the directory holding the file
    pub location: Option<String>,
    /// Param tree XML
    pub param_tree: Option<String>,
    /// Shared param tree id
    pub shared_param_tree_id: Option<i64>,
}

impl MetadataRecord for SourceFile {
    const TABLE: &'static str = "source_file";
    const COLUMNS: &'static str = "id, name, location, param_tree, shared_param_tree_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            location: row.get(2)?,
            param_tree: row.get(3)?,
            shared_param_tree_id: row.get(4)?,
        })
    }
}

/// A controlled vocabulary term referenced by the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvTerm {
    /// Accession (e.g., "MS:1000511")
    pub accession: String,
    /// Term name
    pub name: String,
    /// Accession of the term's unit
    pub unit_accession: Option<String>,
    /// Vocabulary id (e.g., "MS")
    pub cv_id: Option<String>,
}

impl MetadataRecord for CvTerm {
    const TABLE: &'static str = "cv_term";
    const COLUMNS: &'static str = "accession, name, unit_accession, cv_id";
    const KEY: &'static str = "accession";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            accession: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            unit_accession: row.get(2)?,
            cv_id: row.get(3)?,
        })
    }
}

/// A param tree referenced by several records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedParamTree {
    /// Shared param tree id
    pub id: i64,
    /// Param tree XML
    pub data: String,
    /// Schema the tree follows (e.g., "spectrum_params")
    pub schema_name: Option<String>,
}

impl MetadataRecord for SharedParamTree {
    const TABLE: &'static str = "shared_param_tree";
    const COLUMNS: &'static str = "id, data, schema_name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            data: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            schema_name: row.get(2)?,
        })
    }
}
