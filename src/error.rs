//! Error types for scene conversion
//!
//! All fatal errors carry a code for categorization. Anything that can be
//! degraded to "no contribution" during traversal (stale node ids, unknown
//! solids, containers without usable geometry) is *not* an error; the
//! flattener skips it and keeps going. Only document-level conditions are
//! surfaced here.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and document reading errors
//! - **E2xxx**: document structure errors
//!
//! ## Error Codes
//!
//! - `E1001`: I/O error reading the document
//! - `E1002`: JSON syntax or type error
//! - `E2001`: structurally unusable document
//! - `E2002`: designated root node missing from the tree

use std::io;
use thiserror::Error;

use crate::document::NodeId;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading a structure document or assembling a
/// scene graph from it
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading the document
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Insufficient permissions
    /// - Disk read error
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Malformed JSON syntax
    /// - A present field with the wrong type (absent optional fields are
    ///   tolerated, wrongly typed ones are not)
    #[error("[E1002] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but cannot produce a scene graph
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - The designated root node has a non-structural class
    ///
    /// **Suggestions**:
    /// - Check that `structure.root` points at an assembly-root or assembly
    ///   node rather than an auxiliary record
    #[error("[E2001] Invalid document: {0}")]
    InvalidDocument(String),

    /// The designated root node id is absent from the structure tree
    ///
    /// **Error Code**: E2002
    ///
    /// Stale references *inside* the tree are skipped during traversal; the
    /// root is the one reference nothing can recover from.
    #[error("[E2002] Unknown root node: {0}")]
    UnknownNode(NodeId),
}

impl Error {
    /// Create an InvalidDocument error with context about which part of the
    /// document is unusable
    ///
    /// # Arguments
    /// * `context` - What part of the document is invalid (e.g., "root node")
    /// * `message` - Description of the error
    pub fn invalid_document(context: &str, message: &str) -> Self {
        Error::InvalidDocument(format!("{}: {}", context, message))
    }
}
