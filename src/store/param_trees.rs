use rusqlite::{Connection, OptionalExtension};

use super::index::table_exists;
use super::{MzdbError, MzdbStore};
use crate::param_tree::ParamTree;

/// Which record a param tree is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamTreeScope {
    /// The container-level tree in the `mzdb` table
    Mzdb,
    /// A spectrum's own tree, or its shared tree when it has none
    Spectrum(i64),
    /// A chromatogram
    Chromatogram(i64),
    /// A run
    Run(i64),
}

impl std::fmt::Display for ParamTreeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamTreeScope::Mzdb => write!(f, "mzdb"),
            ParamTreeScope::Spectrum(id) => write!(f, "spectrum {}", id),
            ParamTreeScope::Chromatogram(id) => write!(f, "chromatogram {}", id),
            ParamTreeScope::Run(id) => write!(f, "run {}", id),
        }
    }
}

impl MzdbStore {
    /// Read and parse a param tree
    pub fn get_param_tree(&self, scope: ParamTreeScope) -> Result<ParamTree, MzdbError> {
        let xml = match scope {
            ParamTreeScope::Spectrum(id) => {
                let header = self.get_spectrum_header(id)?;
                self.with_connection(|conn| {
                    let own = single_text(conn, "SELECT param_tree FROM spectrum WHERE id = ?1", id)?;
                    match (own, header.shared_param_tree_id) {
                        (Some(xml), _) => Ok(Some(xml)),
                        (None, Some(shared_id)) => {
                            log::debug!("Spectrum {} uses shared param tree {}", id, shared_id);
                            optional_table_text(
                                conn,
                                "shared_param_tree",
                                "SELECT data FROM shared_param_tree WHERE id = ?1",
                                shared_id,
                            )
                        }
                        (None, None) => Ok(None),
                    }
                })?
            }
            ParamTreeScope::Mzdb => self.with_connection(|conn| {
                let xml = conn
                    .query_row("SELECT param_tree FROM mzdb LIMIT 1", [], |row| {
                        row.get::<_, Option<String>>(0)
                    })
                    .optional()?
                    .flatten();
                Ok(xml.filter(|x| !x.trim().is_empty()))
            })?,
            ParamTreeScope::Chromatogram(id) => self.with_connection(|conn| {
                optional_table_text(
                    conn,
                    "chromatogram",
                    "SELECT param_tree FROM chromatogram WHERE id = ?1",
                    id,
                )
            })?,
            ParamTreeScope::Run(id) => self.with_connection(|conn| {
                optional_table_text(conn, "run", "SELECT param_tree FROM run WHERE id = ?1", id)
            })?,
        };

        let xml = xml.ok_or_else(|| MzdbError::NotFound(format!("param tree of {}", scope)))?;
        Ok(ParamTree::parse(&xml)?)
    }
}

/// First column of the row with `id`; NULL and blank text count as absent
fn single_text(conn: &Connection, sql: &str, id: i64) -> Result<Option<String>, MzdbError> {
    let text = conn
        .query_row(sql, [id], |row| row.get::<_, Option<String>>(0))
        .optional()?
        .flatten();
    Ok(text.filter(|t| !t.trim().is_empty()))
}

fn optional_table_text(
    conn: &Connection,
    table: &str,
    sql: &str,
    id: i64,
) -> Result<Option<String>, MzdbError> {
    if !table_exists(conn, table)? {
        log::debug!("No {} table", table);
        return Ok(None);
    }
    single_text(conn, sql, id)
}
