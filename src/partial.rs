//! Sources for the templates named by partial tags.

use crate::log::{Error, ErrorKind};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io,
    path::PathBuf,
};
use tracing::{trace, warn};

/// Loads the text of a partial by name.
///
/// Implementations are shared between every render of a
/// [`Template`][`crate::Template`], and may be called from several threads.
pub trait PartialProvider: Debug + Send + Sync {
    /// Return the template text for the named partial.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the partial cannot be loaded.
    fn get(&self, name: &str) -> Result<String, Error>;
}

/// Loads partials from files.
///
/// Every directory is searched in order, and in each directory every
/// extension is tried in order. The first file that exists is used.
///
/// # Examples
///
/// ```
/// use stache::{Engine, FileProvider};
///
/// let provider = FileProvider::new()
///     .with_paths(["templates", "shared"])
///     .with_extensions([".mustache"]);
/// let engine = Engine::new().with_partials(provider);
/// ```
#[derive(Debug, Clone)]
pub struct FileProvider {
    paths: Vec<PathBuf>,
    extensions: Vec<String>,
    /// When true, names are not checked before they are joined to a path.
    allow_unsafe: bool,
}

impl Default for FileProvider {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::new()],
            extensions: vec![String::new(), ".mustache".into(), ".stache".into()],
            allow_unsafe: false,
        }
    }
}

impl FileProvider {
    /// Create a new [`FileProvider`] that searches the current directory for
    /// `name`, `name.mustache` and `name.stache`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directories that are searched.
    ///
    /// Returns the `FileProvider`, so additional methods may be chained.
    pub fn with_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();

        self
    }

    /// Set the extensions appended to the partial name, including the
    /// leading `.`. An empty extension tries the bare name.
    ///
    /// Returns the `FileProvider`, so additional methods may be chained.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();

        self
    }

    /// Choose whether names that could escape the search directories are
    /// accepted.
    ///
    /// Returns the `FileProvider`, so additional methods may be chained.
    pub fn with_unsafe(mut self, allow_unsafe: bool) -> Self {
        self.allow_unsafe = allow_unsafe;

        self
    }
}

impl PartialProvider for FileProvider {
    fn get(&self, name: &str) -> Result<String, Error> {
        if !self.allow_unsafe && !is_clean(name) {
            warn!(partial = name, "rejected unsafe partial name");
            return Err(Error::new(ErrorKind::UnsafePartialName(name.to_string()))
                .with_help("partial names must be relative and may not contain `.` or `..`"));
        }

        for path in &self.paths {
            for extension in &self.extensions {
                let file = path.join(format!("{name}{extension}"));
                match fs::read_to_string(&file) {
                    Ok(text) => {
                        trace!(file = %file.display(), "read partial");
                        return Ok(text);
                    }
                    Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                    Err(error) => {
                        return Err(Error::new(ErrorKind::Io)
                            .with_source(error)
                            .with_name(name)
                            .with_help(format!("failed to read `{}`", file.display())))
                    }
                }
            }
        }

        Err(Error::new(ErrorKind::PartialNotFound(name.to_string())))
    }
}

/// Return true if the name is a relative path made only of normal segments.
fn is_clean(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('\\')
        && !name.starts_with('/')
        && !name.ends_with('/')
        && name
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."))
}

/// Holds partials in memory.
///
/// A name that was never added loads as an empty template.
///
/// # Examples
///
/// ```
/// use stache::{Engine, StaticProvider};
///
/// let provider = StaticProvider::new().with("user", "<b>{{name}}</b>");
/// let template = Engine::new()
///     .with_partials(provider)
///     .compile_must("{{> user}}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    partials: HashMap<String, String>,
}

impl StaticProvider {
    /// Create a new, empty [`StaticProvider`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a partial.
    ///
    /// Returns the `StaticProvider`, so additional methods may be chained.
    pub fn with<S, T>(mut self, name: S, text: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        self.insert(name, text);

        self
    }

    /// Add a partial, replacing any partial with the same name.
    pub fn insert<S, T>(&mut self, name: S, text: T)
    where
        S: Into<String>,
        T: Into<String>,
    {
        self.partials.insert(name.into(), text.into());
    }
}

impl PartialProvider for StaticProvider {
    fn get(&self, name: &str) -> Result<String, Error> {
        Ok(self.partials.get(name).cloned().unwrap_or_default())
    }
}

impl From<HashMap<String, String>> for StaticProvider {
    fn from(partials: HashMap<String, String>) -> Self {
        Self { partials }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_clean, FileProvider, PartialProvider, StaticProvider};
    use crate::log::ErrorKind;
    use std::fs;

    #[test]
    fn test_is_clean() {
        for name in ["user", "users/item", "a.b/c.mustache"] {
            assert!(is_clean(name), "{name}");
        }
        for name in [
            "",
            "../unsafe",
            "/etc/passwd",
            "dir/",
            "a//b",
            "a/./b",
            "a/../b",
            ".",
            "spec/..\\..\\test.txt",
        ] {
            assert!(!is_clean(name), "{name}");
        }
    }

    #[test]
    fn test_file_provider_search_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("item.stache"), "first stache").unwrap();
        fs::write(second.path().join("item.mustache"), "second mustache").unwrap();
        fs::write(second.path().join("only.mustache"), "only").unwrap();

        let provider = FileProvider::new()
            .with_paths([first.path(), second.path()])
            .with_extensions([".mustache", ".stache"]);

        assert_eq!(provider.get("item").unwrap(), "first stache");
        assert_eq!(provider.get("only").unwrap(), "only");
    }

    #[test]
    fn test_file_provider_nested_name() {
        let directory = tempfile::tempdir().unwrap();
        fs::create_dir(directory.path().join("users")).unwrap();
        fs::write(directory.path().join("users/row.mustache"), "{{name}}").unwrap();

        let provider = FileProvider::new().with_paths([directory.path()]);

        assert_eq!(provider.get("users/row").unwrap(), "{{name}}");
    }

    #[test]
    fn test_file_provider_not_found() {
        let directory = tempfile::tempdir().unwrap();
        let provider = FileProvider::new().with_paths([directory.path()]);
        let error = provider.get("missing").unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::PartialNotFound("missing".into()));
        assert_eq!(error.to_string(), "partial not found: missing");
    }

    #[test]
    fn test_file_provider_unsafe() {
        let provider = FileProvider::new();
        for name in ["../unsafe", "spec/..\\..\\test.txt"] {
            let error = provider.get(name).unwrap_err();
            assert_eq!(error.kind(), &ErrorKind::UnsafePartialName(name.into()));
        }

        let directory = tempfile::tempdir().unwrap();
        fs::create_dir(directory.path().join("inner")).unwrap();
        fs::write(directory.path().join("outside"), "escaped").unwrap();

        let provider = FileProvider::new()
            .with_paths([directory.path().join("inner")])
            .with_unsafe(true);
        assert_eq!(provider.get("../outside").unwrap(), "escaped");
    }

    #[test]
    fn test_static_provider() {
        let mut provider = StaticProvider::new().with("a", "alpha");
        provider.insert("b", "beta");
        provider.insert("a", "replaced");

        assert_eq!(provider.get("a").unwrap(), "replaced");
        assert_eq!(provider.get("b").unwrap(), "beta");
        assert_eq!(provider.get("c").unwrap(), "");
    }
}
