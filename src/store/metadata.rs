use rusqlite::{Connection, OptionalExtension, ToSql};

use super::index::table_exists;
use super::{MzdbError, MzdbStore};
use crate::model::{
    CvTerm, InstrumentConfiguration, MetadataRecord, Run, Sample, SharedParamTree, Software,
    SourceFile,
};

impl MzdbStore {
    /// Runs of the container, ascending by id
    pub fn list_runs(&self) -> Result<Vec<Run>, MzdbError> {
        self.list_records()
    }

    /// Get a run by id
    pub fn get_run(&self, id: i64) -> Result<Run, MzdbError> {
        self.get_record(id)
    }

    /// Samples of the container, ascending by id
    pub fn list_samples(&self) -> Result<Vec<Sample>, MzdbError> {
        self.list_records()
    }

    /// Get a sample by id
    pub fn get_sample(&self, id: i64) -> Result<Sample, MzdbError> {
        self.get_record(id)
    }

    /// Software entries, ascending by id
    pub fn list_software(&self) -> Result<Vec<Software>, MzdbError> {
        self.list_records()
    }

    /// Get a software entry by id
    pub fn get_software(&self, id: i64) -> Result<Software, MzdbError> {
        self.get_record(id)
    }

    /// Instrument configurations, ascending by id
    pub fn list_instrument_configurations(
        &self,
    ) -> Result<Vec<InstrumentConfiguration>, MzdbError> {
        self.list_records()
    }

    /// Get an instrument configuration by id
    pub fn get_instrument_configuration(
        &self,
        id: i64,
    ) -> Result<InstrumentConfiguration, MzdbError> {
        self.get_record(id)
    }

    /// Source files, ascending by id
    pub fn list_source_files(&self) -> Result<Vec<SourceFile>, MzdbError> {
        self.list_records()
    }

    /// Get a source file by id
    pub fn get_source_file(&self, id: i64) -> Result<SourceFile, MzdbError> {
        self.get_record(id)
    }

    /// CV terms, ordered by accession
    pub fn list_cv_terms(&self) -> Result<Vec<CvTerm>, MzdbError> {
        self.list_records()
    }

    /// Get a CV term by accession (e.g., "MS:1000511")
    pub fn get_cv_term(&self, accession: &str) -> Result<CvTerm, MzdbError> {
        self.get_record(accession)
    }

    /// Shared param trees, ascending by id
    pub fn list_shared_param_trees(&self) -> Result<Vec<SharedParamTree>, MzdbError> {
        self.list_records()
    }

    /// Get a shared param tree by id
    pub fn get_shared_param_tree(&self, id: i64) -> Result<SharedParamTree, MzdbError> {
        self.get_record(id)
    }

    fn list_records<R: MetadataRecord>(&self) -> Result<Vec<R>, MzdbError> {
        self.with_connection(|conn| {
            if !table_exists(conn, R::TABLE)? {
                log::debug!("No {} table", R::TABLE);
                return Ok(Vec::new());
            }
            let sql = format!("SELECT {} FROM {} ORDER BY {}", R::COLUMNS, R::TABLE, R::KEY);
            let mut stmt = conn.prepare_cached(&sql)?;
            let records = stmt
                .query_map([], R::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    fn get_record<R, K>(&self, key: K) -> Result<R, MzdbError>
    where
        R: MetadataRecord,
        K: ToSql + std::fmt::Display,
    {
        self.with_connection(|conn| {
            find_record(conn, &key)?
                .ok_or_else(|| MzdbError::NotFound(format!("{} {}", R::TABLE, key)))
        })
    }
}

fn find_record<R: MetadataRecord>(
    conn: &Connection,
    key: &dyn ToSql,
) -> Result<Option<R>, MzdbError> {
    if !table_exists(conn, R::TABLE)? {
        return Ok(None);
    }
    let sql = format!("SELECT {} FROM {} WHERE {} = ?1", R::COLUMNS, R::TABLE, R::KEY);
    Ok(conn.query_row(&sql, [key], R::from_row).optional()?)
}
