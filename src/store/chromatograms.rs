use rusqlite::{Connection, OptionalExtension};

use super::index::table_exists;
use super::{MzdbError, MzdbStore};
use crate::codec::BlobDecoder;
use crate::model::{Chromatogram, ChromatogramData, ChromatogramHeader};

impl MzdbStore {
    /// Headers of every chromatogram, ascending by id
    ///
    /// A container without a `chromatogram` table has none.
    pub fn list_chromatograms(&self) -> Result<Vec<ChromatogramHeader>, MzdbError> {
        self.with_connection(|conn| {
            if !table_exists(conn, "chromatogram")? {
                log::debug!("No chromatogram table");
                return Ok(Vec::new());
            }
            let sql = format!(
                "SELECT {} FROM chromatogram ORDER BY id",
                ChromatogramHeader::SQL_COLUMNS
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let headers = stmt
                .query_map([], ChromatogramHeader::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(headers)
        })
    }

    /// Number of chromatograms
    pub fn get_chromatogram_count(&self) -> Result<usize, MzdbError> {
        self.with_connection(|conn| {
            if !table_exists(conn, "chromatogram")? {
                return Ok(0);
            }
            let count: i64 =
                conn.query_row("SELECT count(*) FROM chromatogram", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    /// Get a chromatogram header by id
    pub fn get_chromatogram_header(&self, id: i64) -> Result<ChromatogramHeader, MzdbError> {
        self.with_connection(|conn| {
            let sql = format!(
                "SELECT {} FROM chromatogram WHERE id = ?1",
                ChromatogramHeader::SQL_COLUMNS
            );
            find_header(conn, &sql, id)?.ok_or_else(|| MzdbError::not_found("chromatogram", id))
        })
    }

    /// Get a chromatogram header by its unique name (e.g., "TIC")
    pub fn get_chromatogram_header_by_name(
        &self,
        name: &str,
    ) -> Result<ChromatogramHeader, MzdbError> {
        self.with_connection(|conn| {
            let sql = format!(
                "SELECT {} FROM chromatogram WHERE name = ?1",
                ChromatogramHeader::SQL_COLUMNS
            );
            find_header(conn, &sql, name)?
                .ok_or_else(|| MzdbError::NotFound(format!("chromatogram {:?}", name)))
        })
    }

    /// Decode the points of a chromatogram
    pub fn get_chromatogram_data(&self, id: i64) -> Result<ChromatogramData, MzdbError> {
        let header = self.get_chromatogram_header(id)?;
        self.chromatogram_data(&header)
    }

    /// Get a chromatogram header together with its points
    pub fn get_chromatogram(&self, id: i64) -> Result<Chromatogram, MzdbError> {
        let header = self.get_chromatogram_header(id)?;
        let data = self.chromatogram_data(&header)?;
        Ok(Chromatogram { header, data })
    }

    /// Get a chromatogram with its points by name
    pub fn get_chromatogram_by_name(&self, name: &str) -> Result<Chromatogram, MzdbError> {
        let header = self.get_chromatogram_header_by_name(name)?;
        let data = self.chromatogram_data(&header)?;
        Ok(Chromatogram { header, data })
    }

    /// Call `callback` with every chromatogram in id order
    ///
    /// Stops at the first error, whether raised by decoding or by the callback.
    pub fn for_each_chromatogram<F, E>(&self, mut callback: F) -> Result<(), E>
    where
        F: FnMut(Chromatogram) -> Result<(), E>,
        E: From<MzdbError>,
    {
        for header in self.list_chromatograms()? {
            let data = self.chromatogram_data(&header)?;
            callback(Chromatogram { header, data })?;
        }
        Ok(())
    }

    fn chromatogram_data(&self, header: &ChromatogramHeader) -> Result<ChromatogramData, MzdbError> {
        let index = self.index()?;
        let encoding = index.encoding(header.data_encoding_id)?;

        let blob = self.with_connection(|conn| {
            let blob = conn
                .query_row(
                    "SELECT data_points FROM chromatogram WHERE id = ?1",
                    [header.id],
                    |row| row.get::<_, Option<Vec<u8>>>(0),
                )
                .optional()?
                .ok_or_else(|| MzdbError::not_found("chromatogram", header.id))?;
            Ok(blob.unwrap_or_default())
        })?;

        // NULL or empty data_points is an empty trace under any compression
        if blob.is_empty() {
            return Ok(ChromatogramData::new(encoding.clone(), Vec::new(), Vec::new())?);
        }
        let bytes = BlobDecoder::decompress(&blob, encoding)?;
        let (times, intensities) = BlobDecoder::read_chromatogram(header.id, &bytes, encoding)?;
        log::debug!("Decoded {} points of chromatogram {}", times.len(), header.id);
        Ok(ChromatogramData::new(encoding.clone(), times, intensities)?)
    }
}

fn find_header<P: rusqlite::ToSql>(
    conn: &Connection,
    sql: &str,
    key: P,
) -> Result<Option<ChromatogramHeader>, MzdbError> {
    if !table_exists(conn, "chromatogram")? {
        return Ok(None);
    }
    Ok(conn
        .query_row(sql, [key], ChromatogramHeader::from_row)
        .optional()?)
}
