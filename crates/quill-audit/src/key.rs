//! Structured change keys.
//!
//! Keys on the wire are dotted paths with bracketed ids, e.g.
//! `host.interfaces[7].ip`. [`ChangeKey`] builds them from segments so
//! call sites never format paths by hand.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(u64),
}

/// A resource path such as `host.interfaces[7].ip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeKey {
    root: String,
    segments: Vec<Segment>,
}

impl ChangeKey {
    /// Start a key at the resource root (e.g. `"host"`).
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    /// Append a `.name` segment.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(Segment::Field(name.into()));
        self
    }

    /// Append an `[id]` segment.
    pub fn index(mut self, id: u64) -> Self {
        self.segments.push(Segment::Index(id));
        self
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(id) => write!(f, "[{}]", id)?,
            }
        }
        Ok(())
    }
}
