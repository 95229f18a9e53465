//! Output scene graph model
//!
//! The conversion result is a tree of named collections mirroring the source
//! hierarchy, with positioned instances at the leaves. Instances share
//! geometry definitions through [`Arc`]; a definition reachable from many
//! instances exists exactly once in memory, and the catalog on
//! [`SceneGraph`] lists each one a single time for the upload side.

use std::sync::Arc;

use nalgebra::Matrix4;
use serde::Serialize;

use crate::geometry::{DefinitionIndex, GeometryDefinition};
use crate::transform::flatten_row_major;

/// Unit label applied to instance transforms unless overridden
pub const DEFAULT_UNITS: &str = "meters";

/// A placed 4x4 transform in the output scene
///
/// Immutable once built; the matrix is stored flattened in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transform {
    /// Row-major 4x4 matrix entries
    pub matrix: [f64; 16],
    /// Unit label the translation is expressed in
    pub units: String,
}

impl Transform {
    /// Create a transform from a matrix and unit label
    pub fn new(matrix: &Matrix4<f64>, units: impl Into<String>) -> Self {
        Self {
            matrix: flatten_row_major(matrix),
            units: units.into(),
        }
    }

    /// The identity transform
    pub fn identity(units: impl Into<String>) -> Self {
        Self::new(&Matrix4::identity(), units)
    }

    /// Translation part of the matrix, as (x, y, z)
    pub fn translation(&self) -> [f64; 3] {
        [self.matrix[3], self.matrix[7], self.matrix[11]]
    }

    /// Returns true if the matrix is exactly the identity
    pub fn is_identity(&self) -> bool {
        const IDENTITY: [f64; 16] = [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        self.matrix == IDENTITY
    }
}

/// One positioned occurrence of a geometry definition
#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    /// Shared geometry definition this instance places
    pub definition: Arc<GeometryDefinition>,
    /// Cumulative root-to-link transform of this occurrence
    pub transform: Transform,
}

/// A named grouping of scene elements, mirroring one structural node
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    /// Name taken from the source node
    pub name: String,
    /// Child collections and instances in traversal order
    pub elements: Vec<SceneElement>,
}

impl Collection {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Total number of instances in this collection and all nested ones
    pub fn instance_count(&self) -> usize {
        self.elements
            .iter()
            .map(|element| match element {
                SceneElement::Instance(_) => 1,
                SceneElement::Collection(collection) => collection.instance_count(),
            })
            .sum()
    }

    /// Total number of collections in this subtree, this one included
    pub fn collection_count(&self) -> usize {
        1 + self
            .elements
            .iter()
            .map(|element| match element {
                SceneElement::Instance(_) => 0,
                SceneElement::Collection(collection) => collection.collection_count(),
            })
            .sum::<usize>()
    }
}

/// One element of a collection
///
/// Serialized with a `type` tag so consumers can dispatch without probing
/// fields.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SceneElement {
    /// A nested named grouping
    Collection(Collection),
    /// A positioned geometry occurrence
    Instance(Instance),
}

/// Configuration for scene assembly
///
/// # Example
///
/// ```
/// use cadscene::SceneConfig;
///
/// let config = SceneConfig::new().with_units("millimeters");
/// assert_eq!(config.units, "millimeters");
/// ```
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Unit label stamped on every instance transform
    pub units: String,
}

impl SceneConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unit label for instance transforms
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            units: DEFAULT_UNITS.to_string(),
        }
    }
}

/// The assembled conversion result
///
/// Wraps the flattener's root collection together with a catalog of every
/// geometry definition built from the graphic section, whether or not an
/// instance places it. The catalog is an in-memory convenience for
/// content-addressed upload and is not part of the serialized scene.
#[derive(Debug, Clone, Serialize)]
pub struct SceneGraph {
    /// Root collection of the scene
    pub root: Collection,
    /// Each distinct definition once, ordered by name
    #[serde(skip)]
    pub definitions: Vec<Arc<GeometryDefinition>>,
}

impl SceneGraph {
    /// Assemble a scene graph from a flattened root collection
    ///
    /// # Arguments
    /// * `root` - The flattener's result for the designated root node
    /// * `index` - The definition index the flattener resolved solids against
    pub fn new(root: Collection, index: &DefinitionIndex) -> Self {
        let mut definitions: Vec<Arc<GeometryDefinition>> =
            index.iter().map(|(_, definition)| definition.clone()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));

        Self { root, definitions }
    }

    /// Number of distinct geometry definitions in the scene
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Total number of instances across the whole scene
    pub fn instance_count(&self) -> usize {
        self.root.instance_count()
    }

    /// Total number of collections across the whole scene, the root included
    pub fn collection_count(&self) -> usize {
        self.root.collection_count()
    }
}
