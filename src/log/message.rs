use super::{Error, ErrorKind};
use crate::region::Region;

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation,
/// or by the underlying writer passed to `render_to`.
pub fn error_write() -> Error {
    Error::new(ErrorKind::Write).with_help("failed to write result of render")
}

/// Return an [`Error`] describing a variable that could not be resolved.
pub fn error_missing_variable(name: &str, line: usize) -> Error {
    Error::new(ErrorKind::MissingVariable(name.to_string()))
        .with_line(line)
        .with_help("provide the value, or disable missing variable errors on the engine")
}

/// Return an [`Error`] explaining that a partial tag was found but no provider exists.
pub fn error_no_provider(name: &str, line: usize) -> Error {
    Error::new(ErrorKind::NoPartialProvider)
        .with_line(line)
        .with_help(format!(
            "partial `{name}` was requested, add a provider with `.with_partials`"
        ))
}

/// Return an [`Error`] describing a tag with no name.
pub fn error_empty_tag(source: &str, region: Region, line: usize) -> Error {
    Error::new(ErrorKind::EmptyTag)
        .with_line(line)
        .with_pointer(source, region)
        .with_help("tags must contain a name, such as `{{name}}`")
}

/// Return an [`Error`] describing an open delimiter with no close delimiter.
pub fn error_unmatched_open(source: &str, region: Region, line: usize) -> Error {
    Error::new(ErrorKind::UnmatchedOpenTag)
        .with_line(line)
        .with_pointer(source, region)
        .with_help("did you forget the closing delimiter?")
}

/// Return an [`Error`] describing a delimiter change tag that could not be read.
pub fn error_malformed_delimiter(source: &str, region: Region, line: usize) -> Error {
    Error::new(ErrorKind::MalformedDelimiter)
        .with_line(line)
        .with_pointer(source, region)
        .with_help("delimiter tags look like `{{=<% %>=}}`")
}
