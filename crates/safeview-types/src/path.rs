//! Construction of the JSON-pointer-like path strings carried by every
//! accumulated error and threaded through the tree walker's context
//! (`views.Main.children[2].children.template`).

use std::fmt;

/// An immutable, cheaply-cloned path through a card document.
///
/// Every traversal pass builds one of these as it descends so that every
/// error it reports carries an identical, precisely formatted location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerPath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

impl PointerPath {
    /// The empty path, used for document-level errors.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with a named field appended.
    #[must_use]
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with a numeric index appended (for list children).
    #[must_use]
    pub fn index(&self, idx: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(idx));
        Self { segments }
    }

    /// True for the document root (no accumulated segments).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for PointerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}
