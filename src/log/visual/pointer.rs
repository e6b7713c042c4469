use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    {get_line_and_column, get_width, Visual, BLANK, EQUAL, HIGHLIGHT, PIPE},
};
use crate::region::Region;

/// A type of `Visual` that points to a specific location within template source.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    line: usize,
    /// The column that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    column: usize,
    /// The length of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Pointer over the given source text and Region.
    ///
    /// Tags that span several lines are highlighted up to the end of their
    /// first line.
    pub fn new(source: &str, region: Region) -> Self {
        let lines: Vec<_> = source.split_terminator('\n').collect();
        let (line, column) = get_line_and_column(&lines, region.begin);
        let text = lines
            .get(line)
            .map(|line| line.trim_end_matches('\r').to_string())
            .unwrap_or_default();

        let highlighted = region.literal(source);
        let highlighted = highlighted.split('\n').next().unwrap_or_default();
        let length = max(1, get_width(highlighted.trim_end_matches('\r')));

        Self {
            line,
            column,
            length,
            text,
        }
    }

    /// Return the zero indexed line the Pointer refers to.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = (self.line + 1).to_string();
        let col = self.column + 1;
        let pad = get_width(&num);
        let align = self.column + self.length;

        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{BLANK:pad$} {EQUAL} help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Pointer;
    use crate::region::Region;

    #[test]
    fn test_pointer_position() {
        let source = "hello\n  {{#a}}\nworld";
        let pointer = Pointer::new(source, Region::new(8..14));

        assert_eq!(pointer.line(), 1);
        assert_eq!(pointer.column, 2);
        assert_eq!(pointer.length, 6);
        assert_eq!(pointer.text, "  {{#a}}");
    }

    #[test]
    fn test_pointer_multiline_tag() {
        let source = "{{!\ncomment";
        let pointer = Pointer::new(source, Region::new(0..11));

        assert_eq!(pointer.line(), 0);
        assert_eq!(pointer.length, 3);
    }
}
