mod pointer;

pub use pointer::Pointer;

use std::fmt::{Debug, Formatter, Result};

const BLANK: &str = "";
const PIPE: &str = "|";
const EQUAL: &str = "=";
const HIGHLIGHT: &str = "^";

/// Describes a type that can be associated with an Error and used
/// to print a visualization.
pub trait Visual: Debug + Send + Sync {
    /// Display the visualization by writing to the given Formatter.
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result;
}

/// Get the line and column offset for the given byte offset.
///
/// Both values are zero indexed. The column is measured in display width.
fn get_line_and_column(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;

    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            let column = line.get(..offset - n).map(get_width).unwrap_or(0);
            return (i, column);
        }
        n += len;
    }

    let length = lines.len().saturating_sub(1);
    let last = lines.last().map(|line| get_width(line)).unwrap_or(0);

    (length, last)
}

/// Wrapper for UnicodeWidthStr::width.
fn get_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(test)]
mod tests {
    use super::get_line_and_column;

    #[test]
    fn test_line_and_column() {
        let lines = vec!["hello", "{{#a}}", "  {{/b}}"];

        assert_eq!(get_line_and_column(&lines, 0), (0, 0));
        assert_eq!(get_line_and_column(&lines, 6), (1, 0));
        assert_eq!(get_line_and_column(&lines, 15), (2, 2));
    }

    #[test]
    fn test_line_and_column_wide() {
        let lines = vec!["🦜 {{a}}"];

        assert_eq!(get_line_and_column(&lines, 5), (0, 3));
    }
}
