//! # Training Documents

use crate::{errors::SCResult, lattice::LineDecode};

/// A named sequence of lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<Line> {
    /// The document name, for reporting.
    pub name: String,

    /// The line images.
    pub lines: Vec<Line>,
}

impl<Line> Document<Line> {
    /// Create a document.
    pub fn new(
        name: impl Into<String>,
        lines: Vec<Line>,
    ) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// The number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Receives best-path transcriptions during training.
pub trait DecodeSink {
    /// Called once per document, in document order.
    ///
    /// ## Arguments
    /// * `iteration` - the EM iteration (zero based) whose model decoded the lines.
    /// * `document` - the document index.
    /// * `decodes` - one decode per line; lines that could not be decoded are empty.
    fn on_document_decoded(
        &mut self,
        iteration: usize,
        document: usize,
        decodes: &[LineDecode],
    ) -> SCResult<()>;
}

/// Discards everything.
impl DecodeSink for () {
    fn on_document_decoded(
        &mut self,
        _iteration: usize,
        _document: usize,
        _decodes: &[LineDecode],
    ) -> SCResult<()> {
        Ok(())
    }
}

/// Collects ``(iteration, document, decodes)``.
impl DecodeSink for Vec<(usize, usize, Vec<LineDecode>)> {
    fn on_document_decoded(
        &mut self,
        iteration: usize,
        document: usize,
        decodes: &[LineDecode],
    ) -> SCResult<()> {
        self.push((iteration, document, decodes.to_vec()));
        Ok(())
    }
}
