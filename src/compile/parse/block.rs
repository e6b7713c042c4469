use crate::{
    compile::{Delimiters, Scope},
    region::Region,
};

/// A section whose close tag has not been found yet.
pub struct Block {
    pub name: String,
    pub inverted: bool,
    /// The 1-based line of the open tag.
    pub line: usize,
    /// The delimiters in effect at the open tag.
    pub delimiters: Delimiters,
    /// The open tag itself.
    pub region: Region,
    /// Everything read inside the section so far.
    pub scope: Scope,
}
