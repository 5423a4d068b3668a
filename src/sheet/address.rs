//! A1-style cell addressing

use std::fmt;

/// Number of columns a worksheet can address (`A` through `XFD`).
pub const MAX_COLS: u32 = 16_384;

/// Number of rows a worksheet can address.
pub const MAX_ROWS: u32 = 1_048_576;

/// Zero-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    pub col: u32,
    pub row: u32,
}

impl CellCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Whether the coordinate fits inside a worksheet
    pub fn in_bounds(&self) -> bool {
        self.col < MAX_COLS && self.row < MAX_ROWS
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cell_address(self.col, self.row))
    }
}

/// Rectangle between two corners, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    pub const fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// Whether `coord` lies inside the rectangle
    pub fn contains(&self, coord: CellCoord) -> bool {
        (self.start.col..=self.end.col).contains(&coord.col)
            && (self.start.row..=self.end.row).contains(&coord.row)
    }

    /// Whether the start corner is above and left of the end corner
    pub fn is_ordered(&self) -> bool {
        self.start.col <= self.end.col && self.start.row <= self.end.row
    }

    /// `A1:C4` notation
    pub fn to_a1(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Column letters for a zero-based column index (`0` is `A`, `26` is `AA`).
pub fn column_name(col: u32) -> String {
    // Bijective base-26: there is no zero digit, so shift by one per place.
    let mut n = col as u64 + 1;
    let mut letters = Vec::with_capacity(3);
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// A1 address for zero-based `(col, row)`; row numbers are one-based.
pub fn cell_address(col: u32, row: u32) -> String {
    format!("{}{}", column_name(col), row as u64 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(1), "B");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(51), "AZ");
        assert_eq!(column_name(52), "BA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
        assert_eq!(column_name(MAX_COLS - 1), "XFD");
    }

    #[test]
    fn test_cell_address() {
        assert_eq!(cell_address(0, 0), "A1");
        assert_eq!(cell_address(2, 3), "C4");
        assert_eq!(cell_address(26, 99), "AA100");
        assert_eq!(cell_address(MAX_COLS - 1, MAX_ROWS - 1), "XFD1048576");
    }

    #[test]
    fn test_range_notation() {
        let range = CellRange::new(CellCoord::new(0, 0), CellCoord::new(5, 101));
        assert_eq!(range.to_a1(), "A1:F102");
        assert!(range.contains(CellCoord::new(5, 101)));
        assert!(!range.contains(CellCoord::new(6, 0)));
        assert!(range.is_ordered());

        let inverted = CellRange::new(CellCoord::new(3, 0), CellCoord::new(1, 0));
        assert!(!inverted.is_ordered());
    }

    #[test]
    fn test_bounds() {
        assert!(CellCoord::new(MAX_COLS - 1, MAX_ROWS - 1).in_bounds());
        assert!(!CellCoord::new(MAX_COLS, 0).in_bounds());
        assert!(!CellCoord::new(0, MAX_ROWS).in_bounds());
    }
}
