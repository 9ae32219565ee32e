use crate::graph::{Value, MASK_16};

use std::fmt::{self, Display, Formatter};

/// Reads the low 16 bits of `value` as a two's complement number.
///
/// Bits above the low 16 are dropped, so negative inputs print as themselves.
///
/// # Example
/// ```
/// # use partsim::to_signed16;
/// assert_eq!(to_signed16(0xFFFF), -1);
/// assert_eq!(to_signed16(0x8000), -32768);
/// assert_eq!(to_signed16(5), 5);
/// assert_eq!(to_signed16(-1), -1);
/// ```
pub fn to_signed16(value: Value) -> Value {
    ((value & MASK_16) ^ 0x8000) - 0x8000
}

/// Table of connector values, one row per clock cycle.
///
/// Rows are printed as `| a | b | ` with values read as 16 bit two's complement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Report {
    /// Returns an empty report with columns `header`.
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Default::default(),
        }
    }

    /// Appends the raw connector values of one cycle.
    pub fn push(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    /// Returns the column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Returns the raw values, before the signed 16 bit adjustment.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Returns the header line.
    pub fn header_line(&self) -> String {
        Line(&self.header).to_string()
    }

    /// Returns every row as printed.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| {
            let signed: Vec<Value> = row.iter().copied().map(to_signed16).collect();
            Line(&signed).to_string()
        })
    }
}

struct Line<'a, T>(&'a [T]);

impl<T: Display> Display for Line<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "| ")?;
        for cell in self.0 {
            write!(f, "{} | ", cell)?;
        }
        Ok(())
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header_line())?;
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
