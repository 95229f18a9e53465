//! # cadscene
//!
//! Converts CAD product-structure documents into flattened, instanced scene
//! graphs.
//!
//! A structure document describes an assembly hierarchy (nodes with local
//! coordinate systems, linked to tessellated solids) as exported by a CAD
//! system. This library walks that hierarchy, accumulates the 4x4 placement
//! along every path from the root, deduplicates geometry into one shared
//! definition per solid, and produces a tree of named collections with
//! positioned instances, ready for handoff to a collaboration server.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Parse JSON structure documents (tree plus graphic containers)
//! - Right-multiplied transform accumulation along assembly paths
//! - One geometry definition per solid id, shared by reference across
//!   instances
//! - Best-effort conversion: stale references are skipped, never fatal
//!
//! ## Example
//!
//! ```no_run
//! use cadscene::{Document, SceneGraph};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Document::from_file("assembly.json")?;
//! let scene = SceneGraph::from_document(&document)?;
//!
//! println!(
//!     "{} instances over {} definitions",
//!     scene.instance_count(),
//!     scene.definition_count()
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod transform;

pub use document::{
    Container, ContainerProperties, CoordinateSystem, Document, Graphic, MaterialProperties,
    MeshFragment, Node, NodeClass, NodeId, SolidId, Structure, StructureTree,
};
pub use error::{Error, Result};
pub use geometry::{DefinitionIndex, GeometryDefinition, MeshBuffer};
pub use material::RenderMaterial;
pub use scene::{Collection, Instance, SceneConfig, SceneElement, SceneGraph, Transform};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

impl Document {
    /// Parse a structure document from a reader
    ///
    /// # Arguments
    ///
    /// * `reader` - A reader containing the JSON document data
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cadscene::Document;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let file = File::open("assembly.json")?;
    /// let document = Document::from_reader(file)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a structure document from a JSON string
    ///
    /// # Arguments
    ///
    /// * `json` - The JSON document text
    ///
    /// # Example
    ///
    /// ```
    /// use cadscene::Document;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let document = Document::from_json(
    ///     r#"{"structure": {"root": 1, "tree": {"1": {"id": 1, "class": "CC_AssemblyRoot"}}}}"#,
    /// )?;
    /// assert_eq!(document.structure.tree.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a structure document from a byte slice
    ///
    /// # Arguments
    ///
    /// * `bytes` - The raw JSON document bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read and parse a structure document from a file path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON document
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl SceneGraph {
    /// Convert a parsed document into a scene graph
    ///
    /// Uses the default scene configuration, which labels instance
    /// transforms in meters.
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed structure document
    ///
    /// # Example
    ///
    /// ```
    /// use cadscene::{Document, SceneGraph};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let document = Document::from_json(
    ///     r#"{
    ///         "structure": {
    ///             "root": 1,
    ///             "tree": {
    ///                 "1": {"id": 1, "class": "CC_AssemblyRoot", "name": "asm", "children": [2]},
    ///                 "2": {"id": 2, "class": "CC_Part", "name": "part", "link": 3},
    ///                 "3": {"id": 3, "class": "CC_Part", "name": "geo", "solids": [10]}
    ///             }
    ///         },
    ///         "graphic": {"containers": [{
    ///             "id": 10,
    ///             "properties": {"material": {"color": [200, 0, 0], "opacity": 1.0}},
    ///             "meshes": [{"vertices": [0, 0, 0, 1, 0, 0, 0, 1, 0], "indices": [0, 1, 2]}]
    ///         }]}
    ///     }"#,
    /// )?;
    ///
    /// let scene = SceneGraph::from_document(&document)?;
    /// assert_eq!(scene.instance_count(), 1);
    /// assert_eq!(scene.definition_count(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_document(document: &Document) -> Result<Self> {
        Self::from_document_with_config(document, SceneConfig::default())
    }

    /// Convert a parsed document into a scene graph with custom configuration
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed structure document
    /// * `config` - Scene assembly settings
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cadscene::{Document, SceneConfig, SceneGraph};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let document = Document::from_file("assembly.json")?;
    ///
    /// let config = SceneConfig::new().with_units("millimeters");
    /// let scene = SceneGraph::from_document_with_config(&document, config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_document_with_config(document: &Document, config: SceneConfig) -> Result<Self> {
        let definitions = DefinitionIndex::build(&document.graphic);
        let root = flatten::flatten_tree(&document.structure, &definitions, &config)?;
        Ok(SceneGraph::new(root, &definitions))
    }
}
