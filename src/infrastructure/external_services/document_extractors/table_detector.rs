use regex::Regex;
use std::sync::LazyLock;

/// Tabs, or runs of two or more spaces, separate cells on a text line.
static CELL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+| {2,}").expect("cell separator regex is valid"));

const MIN_COLUMNS: usize = 2;
const MIN_ROWS: usize = 2;

fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR
        .split(line.trim())
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Finds tables in one page's text lines. A table is a run of at least two
/// consecutive lines that split into the same number (>= 2) of cells.
pub fn detect_tables(lines: &[String]) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    for line in lines {
        let cells = split_cells(line);
        let continues = cells.len() >= MIN_COLUMNS
            && current.first().is_none_or(|first| first.len() == cells.len());

        if continues {
            current.push(cells);
            continue;
        }

        if current.len() >= MIN_ROWS {
            tables.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }

        if cells.len() >= MIN_COLUMNS {
            current.push(cells);
        }
    }

    if current.len() >= MIN_ROWS {
        tables.push(current);
    }

    tables
}
