// src/frontend/token.rs

/// Identifies one source file within a compilation.
///
/// Offsets in a [`Span`] are byte offsets into the file this id names; the
/// mapping from id to file content is owned by the caller (the parser hands
/// us ASTs whose tokens already carry file ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileId(pub u32);

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub file: FileId,
    pub offset: u32, // Byte offset
    pub len: u32,    // Byte length
}

impl Span {
    pub fn new(file: FileId, offset: u32, len: u32) -> Self {
        Self { file, offset, len }
    }

    /// Merge two spans of the same file into one covering both.
    pub fn merge(self, other: Span) -> Span {
        let start = self.offset.min(other.offset);
        let end = (self.offset + self.len).max(other.offset + other.len);
        Span {
            file: self.file,
            offset: start,
            len: end - start,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        // miette uses (offset, length)
        (span.offset as usize, span.len as usize).into()
    }
}

impl From<&Span> for miette::SourceSpan {
    fn from(span: &Span) -> Self {
        (span.offset as usize, span.len as usize).into()
    }
}

/// An identifier token with its location in source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}
