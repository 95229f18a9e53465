//! Input data model for CAD structure documents
//!
//! A structure document has two top-level sections: `structure` (a designated
//! root id plus a tree of nodes keyed by id) and `graphic` (a flat list of
//! geometry containers). Nodes reference each other by id, both through the
//! parent/child hierarchy and out-of-band through `link`; containers are
//! referenced from nodes by solid id. None of these references are verified
//! at parse time: exporters routinely emit stale ids, and the conversion
//! degrades per reference instead of rejecting the document.
//!
//! Ids appear in three shapes in the wild: JSON numbers, stringified numbers
//! in value position, and object keys (always strings in JSON). [`NodeId`]
//! and [`SolidId`] deserialize from all three.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// Identifier of a node in the structure tree
///
/// Deserializes from a JSON number or a stringified number, so the same type
/// works in node bodies and as a tree map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Identifier of a geometry container (a "solid" in the source vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolidId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SolidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an unsigned integer id, numeric or stringified")
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<u64, E>
    where
        E: de::Error,
    {
        Ok(value)
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<u64, E>
    where
        E: de::Error,
    {
        u64::try_from(value).map_err(|_| E::custom(format!("id must be non-negative, got {value}")))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<u64, E>
    where
        E: de::Error,
    {
        value
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid id {value:?}")))
    }
}

fn deserialize_raw_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IdVisitor)
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_raw_id(deserializer).map(NodeId)
    }
}

impl<'de> Deserialize<'de> for SolidId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_raw_id(deserializer).map(SolidId)
    }
}

/// Node kind tag
///
/// Only the five structural kinds take part in scene assembly; every other
/// tag (notes, views, parameter records) falls into [`NodeClass::Other`] and
/// prunes its subtree during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum NodeClass {
    /// Root of a product structure
    #[serde(rename = "CC_AssemblyRoot")]
    AssemblyRoot,
    /// Sub-assembly grouping
    #[serde(rename = "CC_Assembly")]
    Assembly,
    /// Leaf part
    #[serde(rename = "CC_Part")]
    Part,
    /// Reference to a product defined elsewhere
    #[serde(rename = "CC_ProductReference")]
    ProductReference,
    /// Product reference with an extended type annotation
    #[serde(rename = "CC_ProductReferenceET")]
    ProductReferenceEt,
    /// Any non-structural kind, preserved verbatim
    #[serde(untagged)]
    Other(String),
}

impl NodeClass {
    /// Returns true if nodes of this kind participate in scene assembly
    pub fn is_structural(&self) -> bool {
        !matches!(self, NodeClass::Other(_))
    }

    /// The class tag as it appears in the document
    pub fn as_str(&self) -> &str {
        match self {
            NodeClass::AssemblyRoot => "CC_AssemblyRoot",
            NodeClass::Assembly => "CC_Assembly",
            NodeClass::Part => "CC_Part",
            NodeClass::ProductReference => "CC_ProductReference",
            NodeClass::ProductReferenceEt => "CC_ProductReferenceET",
            NodeClass::Other(tag) => tag,
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local placement of a node: an origin and three axis vectors
///
/// Stored in the document as four length-3 rows in the order
/// `[origin, x, y, z]`. Axes are taken as given; no normalization or
/// orthogonality check is applied.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[[f64; 3]; 4]")]
pub struct CoordinateSystem {
    /// Translation part of the placement
    pub origin: [f64; 3],
    /// First basis vector
    pub x_axis: [f64; 3],
    /// Second basis vector
    pub y_axis: [f64; 3],
    /// Third basis vector
    pub z_axis: [f64; 3],
}

impl From<[[f64; 3]; 4]> for CoordinateSystem {
    fn from(rows: [[f64; 3]; 4]) -> Self {
        Self {
            origin: rows[0],
            x_axis: rows[1],
            y_axis: rows[2],
            z_axis: rows[3],
        }
    }
}

/// One node of the product structure tree
///
/// Every field except `id` and `class` is optional in the document; absence
/// means "feature not present", never malformed input.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    /// Unique id of this node within the tree
    pub id: NodeId,
    /// Kind tag controlling structural filtering
    pub class: NodeClass,
    /// Display name, also used for the emitted collection
    #[serde(default)]
    pub name: String,
    /// Local placement relative to the parent node
    #[serde(default, rename = "coordinateSystem")]
    pub coordinate_system: Option<CoordinateSystem>,
    /// Ordered child node ids
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Out-of-band reference to a geometry-bearing node
    #[serde(default)]
    pub link: Option<NodeId>,
    /// Solid ids resolved against the graphic containers
    #[serde(default)]
    pub solids: Vec<SolidId>,
}

impl Node {
    /// Create a node with the given id, class and name and no other features
    pub fn new(id: NodeId, class: NodeClass, name: impl Into<String>) -> Self {
        Self {
            id,
            class,
            name: name.into(),
            coordinate_system: None,
            children: Vec::new(),
            link: None,
            solids: Vec::new(),
        }
    }
}

/// Registry of nodes keyed by id
///
/// All cross-references in the document go through [`StructureTree::node`],
/// which makes every missing-reference path an explicit `Option` branch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StructureTree {
    nodes: HashMap<NodeId, Node>,
}

impl StructureTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Insert a node, replacing any previous node with the same id
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

impl FromIterator<Node> for StructureTree {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut tree = StructureTree::new();
        for node in iter {
            tree.insert(node);
        }
        tree
    }
}

/// The `structure` section: a designated root id plus the node tree
#[derive(Debug, Clone, Deserialize)]
pub struct Structure {
    /// Id of the node the scene graph is rooted at
    pub root: NodeId,
    /// All nodes, keyed by id
    #[serde(default)]
    pub tree: StructureTree,
}

/// Material properties attached to a container
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MaterialProperties {
    /// RGB color, each channel 0-255
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    /// Opacity in 0.0-1.0, 1.0 fully opaque
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_color() -> [u8; 3] {
    [128, 128, 128]
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            color: default_color(),
            opacity: default_opacity(),
        }
    }
}

/// Property bag of a container
///
/// Only the material block is consumed; other exporter-specific properties
/// are ignored.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ContainerProperties {
    /// Visual material of the container's solids
    #[serde(default)]
    pub material: MaterialProperties,
}

/// One raw mesh fragment of a container
///
/// Both buffers are optional: a fragment missing either one is malformed and
/// disqualifies its whole container from producing geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshFragment {
    /// Flat vertex coordinates, three per vertex
    pub vertices: Option<Vec<f64>>,
    /// Flat triangle indices, three per triangle, local to this fragment
    pub indices: Option<Vec<u32>>,
}

/// A geometry container holding mesh fragments and material properties
#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    /// Solid id that nodes reference through their `solids` lists
    pub id: SolidId,
    /// Material and other exporter properties
    #[serde(default)]
    pub properties: ContainerProperties,
    /// Raw mesh fragments; `None` when the container carries no geometry
    pub meshes: Option<Vec<MeshFragment>>,
}

/// The `graphic` section: all geometry containers of the document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Graphic {
    /// Containers in document order
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// A complete parsed structure document
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// Root id and node tree
    pub structure: Structure,
    /// Geometry containers
    #[serde(default)]
    pub graphic: Graphic,
}
