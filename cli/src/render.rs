//! Result set rendering
//!
//! Rows are streamed into fixed-size pages; every full page is rendered
//! right away and a fresh one starts with the same header. The last, partial
//! page is rendered only when it holds rows.

use std::io::{self, Write};

use crate::formatter::{format_value, TableRenderer};
use crate::session::{ResultSet, SessionError};

/// What happened while rendering one result set
#[derive(Debug, Default)]
pub struct RenderStats {
    pub rows: usize,
    pub pages: usize,
    /// Row fetch failure that ended the result set early
    pub fetch_error: Option<SessionError>,
}

/// Stream the rows of the current result set into `table`.
///
/// The caller has already checked that the result set has a column list.
/// A row fetch error stops this result set but is not an error of the
/// render itself; it is reported in [`RenderStats::fetch_error`].
pub async fn render_rows(
    rs: &mut dyn ResultSet,
    columns: &[String],
    table: &mut dyn TableRenderer,
    page_size: usize,
    out: &mut dyn Write,
) -> io::Result<RenderStats> {
    let page_size = page_size.max(1);
    let mut stats = RenderStats::default();
    let mut buffered = 0usize;

    table.set_header(columns);

    loop {
        let row = match rs.next_row().await {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => {
                stats.fetch_error = Some(e);
                break;
            }
        };

        table.append_row(row.iter().map(format_value).collect());
        stats.rows += 1;
        buffered += 1;

        if buffered == page_size {
            table.render(out)?;
            stats.pages += 1;
            buffered = 0;
        }
    }

    if buffered > 0 && !columns.is_empty() {
        table.render(out)?;
        stats.pages += 1;
    }

    Ok(stats)
}

/// Rows-affected and return-status of a finished result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub rows_affected: Option<u64>,
    pub return_status: Option<i32>,
}

impl Summary {
    pub fn of(rs: &dyn ResultSet) -> Self {
        Self {
            rows_affected: rs.rows_affected(),
            return_status: rs.return_status(),
        }
    }

    /// Summary text, `None` when the engine reported neither value
    pub fn line(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(2);
        if let Some(n) = self.rows_affected {
            let noun = if n == 1 { "row" } else { "rows" };
            parts.push(format!("{} {} affected", n, noun));
        }
        if let Some(status) = self.return_status {
            parts.push(format!("return status = {}", status));
        }
        if parts.is_empty() {
            None
        } else {
            Some(format!("({})", parts.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{TextTable, Theme};
    use crate::session::Value;
    use crate::test_support::{CountingTable, StaticResultSet};

    #[test]
    fn test_summary_lines() {
        let s = |rows_affected, return_status| Summary { rows_affected, return_status }.line();
        assert_eq!(s(Some(1), None).as_deref(), Some("(1 row affected)"));
        assert_eq!(s(Some(0), None).as_deref(), Some("(0 rows affected)"));
        assert_eq!(s(Some(3), None).as_deref(), Some("(3 rows affected)"));
        assert_eq!(s(None, Some(0)).as_deref(), Some("(return status = 0)"));
        assert_eq!(
            s(Some(2), Some(-6)).as_deref(),
            Some("(2 rows affected, return status = -6)")
        );
        assert_eq!(s(None, None), None);
    }

    async fn pages_for(rows: usize, page_size: usize) -> (usize, usize) {
        let data = (0..rows).map(|i| vec![Value::Int(i as i64)]).collect();
        let mut rs = StaticResultSet::single(vec!["n"], data);
        let columns = vec!["n".to_string()];
        let mut table = CountingTable::default();
        let stats = render_rows(&mut rs, &columns, &mut table, page_size, &mut io::sink())
            .await
            .unwrap();
        assert_eq!(stats.pages, table.renders);
        (stats.rows, table.renders)
    }

    #[tokio::test]
    async fn test_render_count_is_ceiling_of_rows_over_page_size() {
        assert_eq!(pages_for(0, 3).await, (0, 0));
        assert_eq!(pages_for(1, 3).await, (1, 1));
        assert_eq!(pages_for(3, 3).await, (3, 1));
        assert_eq!(pages_for(4, 3).await, (4, 2));
        assert_eq!(pages_for(7, 1).await, (7, 7));
        assert_eq!(pages_for(10, 3000).await, (10, 1));
    }

    #[tokio::test]
    async fn test_each_page_repeats_the_header() {
        let data = (1..=3).map(|i| vec![Value::Int(i)]).collect();
        let mut rs = StaticResultSet::single(vec!["x"], data);
        let mut table = TextTable::new(Theme::AsciiCompact, " ", true);
        let mut out = Vec::new();
        render_rows(&mut rs, &["x".to_string()], &mut table, 2, &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "x\n-\n1\n2\nx\n-\n3\n");
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_rendered_rows() {
        let data = vec![vec![Value::Int(1)], vec![Value::Int(2)]];
        let mut rs = StaticResultSet::single(vec!["x"], data).failing_after(1);
        let mut table = CountingTable::default();
        let stats = render_rows(&mut rs, &["x".to_string()], &mut table, 10, &mut io::sink())
            .await
            .unwrap();
        assert_eq!(stats.rows, 1);
        assert_eq!(table.renders, 1);
        assert!(stats.fetch_error.is_some());
    }
}
