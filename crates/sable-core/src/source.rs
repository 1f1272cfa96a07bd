//! Source files handed to the front end.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::span::LineIndex;

/// A named piece of Sable source text.
///
/// The text is reference counted so AST nodes can keep a handle on it
/// without copying.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: Rc<str>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Rc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(path, text))
    }

    /// Module name derived from the file stem, e.g. `math` for `src/math.sb`.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "main".to_string())
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(self.text.clone())
    }
}
