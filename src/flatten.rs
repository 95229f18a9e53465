//! Recursive flattening of the structure tree into scene collections
//!
//! The flattener walks the assembly hierarchy depth-first, keeping only
//! structural node kinds, and emits one collection per visited node. Nodes
//! carrying a `link` contribute one positioned instance per resolvable solid
//! of the link target, placed with the transform accumulated along the path
//! from the root down to the linking node itself.
//!
//! Every reference inside the tree may be stale. A missing child, link
//! target or solid definition removes only its own contribution; siblings
//! and the rest of the traversal are unaffected. The one unrecoverable
//! reference is the designated root id, surfaced as an error by
//! [`flatten_tree`].
//!
//! Each recursive call copies the ancestor path instead of mutating a shared
//! one, so sibling subtrees never observe each other's state. A node whose
//! id already appears on its own ancestor path is pruned; trees are not
//! supposed to contain cycles, but a malformed export must not hang the
//! conversion.

use tracing::{debug, info, warn};

use crate::document::{Node, NodeId, Structure, StructureTree};
use crate::error::{Error, Result};
use crate::geometry::DefinitionIndex;
use crate::scene::{Collection, Instance, SceneConfig, SceneElement, Transform};
use crate::transform::compose_path;

/// Flatten a structure tree into the root collection
///
/// Looks up the designated root node and traverses from there. The only
/// error conditions are document-level: a root id that is not in the tree,
/// or a root node whose kind is not structural.
///
/// # Arguments
/// * `structure` - Root id and node registry of the parsed document
/// * `definitions` - Geometry definitions the tree's solids resolve against
/// * `config` - Scene assembly settings
///
/// # Returns
/// The collection mirroring the root node
pub fn flatten_tree(
    structure: &Structure,
    definitions: &DefinitionIndex,
    config: &SceneConfig,
) -> Result<Collection> {
    let root_id = structure.root;
    let tree = &structure.tree;

    let root_node = tree.node(root_id).ok_or(Error::UnknownNode(root_id))?;

    info!(root = %root_id, nodes = tree.len(), "flattening structure tree");

    match traverse(tree, definitions, root_node, &[], config) {
        Some(collection) => {
            info!(
                collections = collection.collection_count(),
                instances = collection.instance_count(),
                definitions = definitions.len(),
                "flattened structure tree"
            );
            Ok(collection)
        }
        None => Err(Error::invalid_document(
            "root node",
            &format!("class {} is not structural", root_node.class),
        )),
    }
}

/// Traverse one node of the structure tree
///
/// Returns the collection mirroring `node`, or `None` when the node's kind
/// is not structural (which prunes its whole subtree). Link-derived
/// instances come before child collections in the element list, and children
/// keep their declaration order.
///
/// # Arguments
/// * `tree` - Node registry for child and link resolution
/// * `definitions` - Geometry definitions keyed by solid id
/// * `node` - The node to traverse
/// * `ancestors` - Ids of the nodes above `node`, root first
/// * `config` - Scene assembly settings
pub fn traverse(
    tree: &StructureTree,
    definitions: &DefinitionIndex,
    node: &Node,
    ancestors: &[NodeId],
    config: &SceneConfig,
) -> Option<Collection> {
    if !node.class.is_structural() {
        debug!(id = %node.id, class = %node.class, "non-structural node pruned");
        return None;
    }
    if ancestors.contains(&node.id) {
        warn!(id = %node.id, "node appears on its own ancestor path, cycle pruned");
        return None;
    }

    debug!(id = %node.id, name = %node.name, class = %node.class, "visiting node");

    // Own path of this node: the ancestor chain plus the node itself. Each
    // call works on its own copy.
    let mut path = ancestors.to_vec();
    path.push(node.id);

    let mut collection = Collection::new(node.name.as_str());

    if let Some(link_id) = node.link {
        match tree.node(link_id) {
            Some(target) => {
                debug!(
                    link = %link_id,
                    target = %target.name,
                    class = %target.class,
                    solids = target.solids.len(),
                    "resolved link"
                );

                // One transform per link occurrence, shared by all solids of
                // the target.
                let matrix = compose_path(tree, &path);
                let transform = Transform::new(&matrix, config.units.as_str());

                for &solid_id in &target.solids {
                    match definitions.get(solid_id) {
                        Some(definition) => {
                            collection.elements.push(SceneElement::Instance(Instance {
                                definition: definition.clone(),
                                transform: transform.clone(),
                            }));
                        }
                        None => {
                            debug!(solid = %solid_id, "no geometry definition for solid, skipped");
                        }
                    }
                }
            }
            None => {
                warn!(link = %link_id, "link target not in tree, skipped");
            }
        }
    }

    for &child_id in &node.children {
        let Some(child) = tree.node(child_id) else {
            warn!(child = %child_id, "child id not in tree, skipped");
            continue;
        };
        if let Some(child_collection) = traverse(tree, definitions, child, &path, config) {
            collection
                .elements
                .push(SceneElement::Collection(child_collection));
        }
    }

    Some(collection)
}
