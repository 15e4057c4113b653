//! Data tables with click-to-sort headers.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub label: String,
    pub sortable: bool,
    direction: SortDirection,
}

impl ColumnHeader {
    pub fn sortable(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sortable: true,
            direction: SortDirection::None,
        }
    }

    pub fn fixed(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sortable: false,
            direction: SortDirection::None,
        }
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Sort key for one cell. A column is either entirely numeric or entirely
/// textual, never mixed.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => locale_cmp(a, b),
            _ => Ordering::Equal,
        }
    }
}

/// Headers plus rows of cell text, aligned by column index. At most one
/// header carries a direction other than [`SortDirection::None`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableModel {
    headers: Vec<ColumnHeader>,
    rows: Vec<Vec<String>>,
}

impl TableModel {
    pub fn new(headers: Vec<ColumnHeader>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[ColumnHeader] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cell text of one column, top to bottom. Short rows yield `""`.
    pub fn column(&self, column: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(column).map(String::as_str).unwrap_or(""))
            .collect()
    }

    pub fn active_sort(&self) -> Option<(usize, SortDirection)> {
        self.headers
            .iter()
            .enumerate()
            .find(|(_, header)| header.direction != SortDirection::None)
            .map(|(index, header)| (index, header.direction))
    }

    /// Sorts rows by `column`: ascending on the first click, then toggling.
    /// Every other header is reset. A table without rows is left untouched.
    pub fn sort_by(&mut self, column: usize) -> Result<SortDirection, TableError> {
        let header = self
            .headers
            .get(column)
            .ok_or(TableError::ColumnOutOfRange {
                column,
                columns: self.headers.len(),
            })?;
        if !header.sortable {
            return Err(TableError::NotSortable { column });
        }
        if self.rows.is_empty() {
            return Ok(header.direction);
        }

        let direction = if header.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        for (index, header) in self.headers.iter_mut().enumerate() {
            header.direction = if index == column {
                direction
            } else {
                SortDirection::None
            };
        }

        let keys = column_keys(&self.column(column));
        let mut keyed: Vec<(SortKey, Vec<String>)> =
            keys.into_iter().zip(self.rows.drain(..)).collect();
        // `sort_by` is stable, so equal keys keep their relative order in
        // both directions.
        keyed.sort_by(|(a, _), (b, _)| {
            let ordering = a.compare(b);
            match direction {
                SortDirection::Descending => ordering.reverse(),
                _ => ordering,
            }
        });
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();

        Ok(direction)
    }
}

fn column_keys(cells: &[&str]) -> Vec<SortKey> {
    let numbers: Option<Vec<f64>> = cells.iter().map(|cell| parse_leading_number(cell)).collect();
    match numbers {
        Some(numbers) => numbers.into_iter().map(SortKey::Number).collect(),
        None => cells
            .iter()
            .map(|cell| SortKey::Text(cell.trim().to_string()))
            .collect(),
    }
}

/// Reads the longest numeric prefix of `text`, so `"85.5%"` gives `85.5`.
/// Returns `None` when the text does not start with a number.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Vietnamese letters: the base letter, the letter's rank among those sharing
/// that base (a < ă < â, d < đ, o < ô < ơ), and its spellings by tone in
/// collation order (none, huyền, hỏi, ngã, sắc, nặng).
const LETTERS: &[(char, u8, &str)] = &[
    ('a', 0, "aàảãáạ"),
    ('a', 1, "ăằẳẵắặ"),
    ('a', 2, "âầẩẫấậ"),
    ('d', 1, "đ"),
    ('e', 0, "eèẻẽéẹ"),
    ('e', 1, "êềểễếệ"),
    ('i', 0, "iìỉĩíị"),
    ('o', 0, "oòỏõóọ"),
    ('o', 1, "ôồổỗốộ"),
    ('o', 2, "ơờởỡớợ"),
    ('u', 0, "uùủũúụ"),
    ('u', 1, "ưừửữứự"),
    ('y', 0, "yỳỷỹýỵ"),
];

/// Accents outside Vietnamese sort after every tone of their base letter.
const FOREIGN: &[(char, &str)] = &[
    ('a', "äåā"),
    ('c', "ç"),
    ('e', "ëē"),
    ('i', "ïī"),
    ('n', "ñ"),
    ('o', "öøō"),
    ('u', "üū"),
    ('y', "ÿ"),
];

const FOREIGN_TONE: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Letter {
    base: char,
    rank: u8,
}

/// Splits a lowercase char into its letter and its tone.
fn collation_key(c: char) -> (Letter, u8) {
    for (base, rank, spellings) in LETTERS {
        if let Some(tone) = spellings.chars().position(|s| s == c) {
            return (Letter { base: *base, rank: *rank }, tone as u8);
        }
    }
    for (base, spellings) in FOREIGN {
        if let Some(index) = spellings.chars().position(|s| s == c) {
            return (
                Letter { base: *base, rank: 0 },
                FOREIGN_TONE + index as u8,
            );
        }
    }
    (Letter { base: c, rank: 0 }, 0)
}

fn keys(text: &str) -> impl Iterator<Item = (Letter, u8)> + '_ {
    text.chars().flat_map(char::to_lowercase).map(collation_key)
}

/// Vietnamese string ordering in the manner of a browser's `localeCompare`:
/// letters first (ă, â, đ, ê, ô, ơ and ư are letters of their own), then
/// tones, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    keys(a)
        .map(|(letter, _)| letter)
        .cmp(keys(b).map(|(letter, _)| letter))
        .then_with(|| keys(a).map(|(_, tone)| tone).cmp(keys(b).map(|(_, tone)| tone)))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
