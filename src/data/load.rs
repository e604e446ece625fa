//! CSV loading with missing-value normalization
//!
//! The raw sensor export uses several spellings for a missing cell: the
//! empty string, `NA`, and the spreadsheet artifact `#DIV/0!`. All three are
//! rewritten to the single [`MISSING`] marker at load time so downstream
//! filtering only has to know one spelling.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Uniform in-table marker for a missing cell
pub const MISSING: &str = "NA";

const MISSING_SPELLINGS: [&str; 3] = ["", "NA", "#DIV/0!"];

/// An unparsed table: header row plus string cells, missing values already
/// normalized to [`MISSING`].
#[derive(Clone, Debug)]
pub struct RawTable {
    /// Column names from the header row
    pub headers: Vec<String>,
    /// Data rows, each exactly `headers.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of a named column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read a CSV file into a [`RawTable`].
///
/// Cells are unquoted on the way in (the sensor export quotes text fields);
/// a row with the wrong field count is a hard [`Error::Parse`], not a skip.
pub fn load_csv(path: &Path) -> Result<RawTable> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let header_line = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(Error::Parse {
                line: 1,
                message: "empty file, expected a header row".to_string(),
            })
        }
    };
    let headers: Vec<String> = split_row(&header_line);
    if headers.is_empty() {
        return Err(Error::Parse {
            line: 1,
            message: "header row has no columns".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let cells = split_row(&line);
        if cells.len() != headers.len() {
            return Err(Error::Parse {
                line: i + 2,
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    cells.len()
                ),
            });
        }
        rows.push(cells);
    }

    Ok(RawTable { headers, rows })
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',').map(normalize_cell).collect()
}

fn normalize_cell(cell: &str) -> String {
    let cell = cell.trim().trim_matches('"');
    if MISSING_SPELLINGS.contains(&cell) {
        MISSING.to_string()
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_basic() {
        let f = write_csv("a,b,classe\n1,2,A\n3,4,B\n");
        let table = load_csv(f.path()).unwrap();
        assert_eq!(table.headers, vec!["a", "b", "classe"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["1", "2", "A"]);
        assert_eq!(table.column_index("classe"), Some(2));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn test_missing_spellings_normalized() {
        let f = write_csv("a,b,c\n,NA,#DIV/0!\n1,2,3\n");
        let table = load_csv(f.path()).unwrap();
        assert_eq!(table.rows[0], vec![MISSING, MISSING, MISSING]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_quoted_cells_unquoted() {
        let f = write_csv("name,x\n\"pedro\",1\n");
        let table = load_csv(f.path()).unwrap();
        assert_eq!(table.rows[0][0], "pedro");
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let f = write_csv("a,b\n1,2\n3\n");
        let err = load_csv(f.path()).unwrap_err();
        assert!(format!("{err}").contains("line 3"));
    }

    #[test]
    fn test_empty_file_is_parse_error() {
        let f = write_csv("");
        assert!(load_csv(f.path()).is_err());
    }
}
