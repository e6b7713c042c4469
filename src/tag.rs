//! Read-only view of the tags inside a compiled template.

use crate::compile::tree::Tree;
use std::fmt::{Display, Formatter, Result};

/// The kind of a [`Tag`].
///
/// There is no kind for comments, delimiter changes or invalid tags.
/// Comments and delimiter changes are dropped while compiling, and a template
/// with an invalid tag fails to compile, so none of them can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Variable,
    Section,
    InvertedSection,
    Partial,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let name = match self {
            Kind::Variable => "Variable",
            Kind::Section => "Section",
            Kind::InvertedSection => "InvertedSection",
            Kind::Partial => "Partial",
        };

        write!(f, "{name}")
    }
}

/// A tag found in a [`Template`][`crate::Template`].
#[derive(Debug, Clone, Copy)]
pub struct Tag<'a> {
    tree: &'a Tree,
}

impl<'a> Tag<'a> {
    /// Return the [`Kind`] of the tag.
    pub fn kind(&self) -> Kind {
        match self.tree {
            Tree::Section(section) if section.inverted => Kind::InvertedSection,
            Tree::Section(_) => Kind::Section,
            Tree::Partial(_) => Kind::Partial,
            Tree::Variable(_) | Tree::Text(_) => Kind::Variable,
        }
    }

    /// Return the name inside the tag.
    pub fn name(&self) -> &'a str {
        match self.tree {
            Tree::Variable(variable) => &variable.name,
            Tree::Section(section) => &section.name,
            Tree::Partial(partial) => &partial.name,
            Tree::Text(_) => "",
        }
    }

    /// Return the tags nested inside a section.
    ///
    /// Variables and partials have no children. The content of a partial is
    /// only known once it is loaded at render time.
    pub fn tags(&self) -> Vec<Tag<'a>> {
        match self.tree {
            Tree::Section(section) => collect(&section.scope.data),
            _ => vec![],
        }
    }
}

/// Wrap every tree that is not text.
pub(crate) fn collect(trees: &[Tree]) -> Vec<Tag<'_>> {
    trees
        .iter()
        .filter(|tree| !matches!(tree, Tree::Text(_)))
        .map(|tree| Tag { tree })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Kind, Tag};
    use crate::compile;

    fn shape(tags: Vec<Tag<'_>>) -> Vec<(Kind, String, usize)> {
        tags.into_iter()
            .map(|tag| (tag.kind(), tag.name().to_string(), tag.tags().len()))
            .collect()
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Partial.to_string(), "Partial");
        assert_eq!(Kind::InvertedSection.to_string(), "InvertedSection");
    }

    #[test]
    fn test_tags() {
        assert!(compile("hello world").unwrap().tags().is_empty());

        let template = compile("hello {{name}}").unwrap();
        assert_eq!(shape(template.tags()), vec![(Kind::Variable, "name".into(), 0)]);

        let template = compile(
            "{{#name}}hello {{name}}{{/name}}{{^name}}hello {{name2}}{{/name}}",
        )
        .unwrap();
        let tags = template.tags();
        assert_eq!(
            shape(tags.clone()),
            vec![
                (Kind::Section, "name".into(), 1),
                (Kind::InvertedSection, "name".into(), 1),
            ]
        );
        assert_eq!(shape(tags[0].tags()), vec![(Kind::Variable, "name".into(), 0)]);
        assert_eq!(shape(tags[1].tags()), vec![(Kind::Variable, "name2".into(), 0)]);
    }

    #[test]
    fn test_tags_skip_comments_and_delimiters() {
        let template = compile("{{! note }}{{=<% %>=}}<% >item %><%{raw}%>").unwrap();

        assert_eq!(
            shape(template.tags()),
            vec![
                (Kind::Partial, "item".into(), 0),
                (Kind::Variable, "raw".into(), 0),
            ]
        );
    }
}
