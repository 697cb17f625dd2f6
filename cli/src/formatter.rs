//! Text table output
//!
//! Row values are turned into display strings here, and [`TextTable`]
//! lays a page of rows out as a compact table. Pagination lives in
//! [`crate::render`].

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::error::CLIError;
use crate::session::Value;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display form of a single value
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        Value::Bytes(b) => format!("0x{}", hex::encode(b)),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => s.trim().to_string(),
    }
}

/// Table drawing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    AsciiCompact,
    #[default]
    UtfCompact,
}

impl Theme {
    fn rule(&self) -> char {
        match self {
            Theme::AsciiCompact => '-',
            Theme::UtfCompact => '─',
        }
    }
}

impl FromStr for Theme {
    type Err = CLIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asciicompact" | "ascii" => Ok(Theme::AsciiCompact),
            "utfcompact" | "utf" => Ok(Theme::UtfCompact),
            other => Err(CLIError::ConfigurationError(format!(
                "unknown theme '{}', expected ASCIICompact or UtfCompact",
                other
            ))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::AsciiCompact => write!(f, "ASCIICompact"),
            Theme::UtfCompact => write!(f, "UtfCompact"),
        }
    }
}

/// Sink for one page of rows
pub trait TableRenderer {
    fn set_header(&mut self, columns: &[String]);

    fn append_row(&mut self, row: Vec<String>);

    /// Write the buffered page and clear it. The header is kept.
    fn render(&mut self, out: &mut dyn Write) -> io::Result<()>;
}

/// Compact table: header, one rule line, then rows with no borders
pub struct TextTable {
    theme: Theme,
    separator: String,
    show_header: bool,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(theme: Theme, separator: impl Into<String>, show_header: bool) -> Self {
        Self {
            theme,
            separator: separator.into(),
            show_header,
            header: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = if self.show_header {
            self.header.iter().map(|h| h.chars().count()).collect()
        } else {
            vec![0; self.header.len()]
        };
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    fn write_line(&self, out: &mut dyn Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
        let line = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!("{:width$}", cell, width = *width)
            })
            .collect::<Vec<_>>()
            .join(&self.separator);
        writeln!(out, "{}", line.trim_end())
    }
}

impl TableRenderer for TextTable {
    fn set_header(&mut self, columns: &[String]) {
        self.header = columns.to_vec();
    }

    fn append_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let widths = self.column_widths();

        if self.show_header {
            self.write_line(out, &self.header, &widths)?;
            let rules: Vec<String> = widths
                .iter()
                .map(|w| self.theme.rule().to_string().repeat(*w))
                .collect();
            self.write_line(out, &rules, &widths)?;
        }
        for row in &self.rows {
            self.write_line(out, row, &widths)?;
        }

        self.rows.clear();
        Ok(())
    }
}
