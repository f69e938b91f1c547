// Delimited-text reading: turns an export file into the header row and raw
// cell grid the record parser consumes. Spreadsheet binaries are not read
// here; any caller that has typed cells can hand them to the parser directly.
use crate::error::AppError;
use crate::types::RawCell;
use csv::ReaderBuilder;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub header: Vec<RawCell>,
    pub rows: Vec<Vec<RawCell>>,
}

/// Tab for `.tsv`/`.tab` files, comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

pub fn read_grid(path: &Path) -> Result<Grid, AppError> {
    let file = File::open(path)?;
    let grid = read_grid_from(file, delimiter_for(path))?;
    debug!(
        "Read {} header cell(s) and {} row(s) from {}",
        grid.header.len(),
        grid.rows.len(),
        path.display()
    );
    Ok(grid)
}

/// Read every record as raw text cells. The first record is the header;
/// rows may be ragged.
pub fn read_grid_from<R: Read>(reader: R, delimiter: u8) -> Result<Grid, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut grid = Grid::default();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let cells: Vec<RawCell> = record.iter().map(to_cell).collect();
        if idx == 0 {
            grid.header = cells;
        } else {
            grid.rows.push(cells);
        }
    }
    if let Some(RawCell::Text(first)) = grid.header.first_mut() {
        // Spreadsheet tools like to prepend a byte order mark.
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(grid)
}

fn to_cell(value: &str) -> RawCell {
    if value.trim().is_empty() {
        RawCell::Empty
    } else {
        RawCell::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_header_and_ragged_rows() {
        let data = "\u{feff}Campaign Name,Reach\nCamp A,\"1,200\"\nCamp B\n";
        let grid = read_grid_from(data.as_bytes(), b',').unwrap();
        assert_eq!(grid.header, vec![RawCell::from("Campaign Name"), RawCell::from("Reach")]);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[0][1], RawCell::from("1,200"));
        assert_eq!(grid.rows[1].len(), 1);
    }

    #[test]
    fn blank_cells_become_empty() {
        let grid = read_grid_from("a,b\n , x\n".as_bytes(), b',').unwrap();
        assert_eq!(grid.rows[0][0], RawCell::Empty);
    }

    #[test]
    fn empty_input_gives_empty_grid() {
        let grid = read_grid_from("".as_bytes(), b',').unwrap();
        assert!(grid.header.is_empty());
        assert!(grid.rows.is_empty());
    }

    #[test]
    fn tsv_files_use_tabs() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        write!(file, "Country\tReach\nUA\t5\n").unwrap();
        let grid = read_grid(file.path()).unwrap();
        assert_eq!(grid.header.len(), 2);
        assert_eq!(grid.rows[0], vec![RawCell::from("UA"), RawCell::from("5")]);
        assert_eq!(delimiter_for(Path::new("x.csv")), b',');
        assert_eq!(delimiter_for(Path::new("X.TSV")), b'\t');
    }
}
