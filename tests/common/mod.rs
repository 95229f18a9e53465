//! Shared utilities for conversion tests
//!
//! Builders that assemble structure documents in their JSON wire shape, plus
//! helpers for digging instances out of a converted scene graph.

use cadscene::{Collection, Instance, SceneElement};
use serde_json::{Value, json};

/// A mesh fragment holding one triangle in the xy plane
pub fn triangle_fragment() -> Value {
    json!({
        "vertices": [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        "indices": [0, 1, 2]
    })
}

/// A container with a single triangle and the given material
pub fn container(id: u64, color: [u8; 3], opacity: f64) -> Value {
    json!({
        "id": id,
        "properties": {"material": {"color": color, "opacity": opacity}},
        "meshes": [triangle_fragment()]
    })
}

/// A coordinate system translating by (x, y, z) with unit axes
pub fn translation(x: f64, y: f64, z: f64) -> Value {
    json!([[x, y, z], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
}

/// Assemble document text from a tree object and a container list
pub fn document(root: u64, tree: Value, containers: Value) -> String {
    json!({
        "structure": {"root": root, "tree": tree},
        "graphic": {"containers": containers}
    })
    .to_string()
}

/// Collect references to all instances of a collection, depth-first
pub fn collect_instances(collection: &Collection) -> Vec<&Instance> {
    let mut instances = Vec::new();
    for element in &collection.elements {
        match element {
            SceneElement::Instance(instance) => instances.push(instance),
            SceneElement::Collection(nested) => instances.extend(collect_instances(nested)),
        }
    }
    instances
}
