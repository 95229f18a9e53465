//! Geometry deduplication
//!
//! This module turns raw graphic containers into reusable geometry
//! definitions:
//! - Merging a container's mesh fragments into one indexed triangle mesh
//! - Deriving the render material from the container's color properties
//! - Indexing definitions by solid id so instances can share them
//!
//! A container that yields a definition yields exactly one, wrapped in an
//! [`Arc`]; every instance referencing the same solid id holds a clone of
//! that `Arc`, never a copy of the geometry.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::{Graphic, MeshFragment, SolidId};
use crate::material::RenderMaterial;

/// Leading count marking a triangle record in the face buffer
///
/// The face buffer is a generalized polygon soup: each record is a vertex
/// count followed by that many vertex indices. Merged CAD tessellations only
/// ever produce triangles, so every record here starts with 3.
const TRIANGLE_FACE: u32 = 3;

/// One merged indexed triangle mesh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshBuffer {
    /// Flat vertex coordinates, three per vertex
    pub vertices: Vec<f64>,
    /// Face records, four entries per triangle: `[3, i, j, k]`
    pub faces: Vec<u32>,
}

impl MeshBuffer {
    /// Number of vertices in the buffer
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles in the buffer
    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 4
    }
}

/// A reusable geometry definition: one merged mesh plus its material
///
/// Built at most once per solid id and shared by reference across all
/// instances that place it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryDefinition {
    /// Deterministic name derived from the solid id
    pub name: String,
    /// Merged triangle mesh of all the container's fragments
    pub mesh: MeshBuffer,
    /// Render material derived from the container's properties
    pub material: RenderMaterial,
}

/// Merge mesh fragments into one vertex buffer and one face buffer
///
/// Each fragment's triangle indices are re-based by the number of vertices
/// already merged, so they stay valid into the combined vertex buffer. A
/// trailing partial index triple is dropped.
///
/// Returns `None` when the fragment list is empty or any fragment is
/// malformed (missing either buffer, a vertex buffer whose length is not a
/// multiple of three, or an index that no longer fits in `u32` once
/// re-based). A malformed fragment disqualifies the whole container, not
/// just itself.
///
/// # Arguments
/// * `fragments` - The container's raw mesh fragments
///
/// # Returns
/// The merged buffer, or `None` when no usable mesh can be produced
pub fn merge_fragments(fragments: &[MeshFragment]) -> Option<MeshBuffer> {
    if fragments.is_empty() {
        return None;
    }

    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for fragment in fragments {
        let frag_vertices = fragment.vertices.as_ref()?;
        let frag_indices = fragment.indices.as_ref()?;
        if frag_vertices.len() % 3 != 0 {
            return None;
        }

        // Indices of this fragment are local; shift them past the vertices
        // merged so far.
        let base = (vertices.len() / 3) as u32;
        vertices.extend_from_slice(frag_vertices);

        for triangle in frag_indices.chunks_exact(3) {
            faces.push(TRIANGLE_FACE);
            faces.push(triangle[0].checked_add(base)?);
            faces.push(triangle[1].checked_add(base)?);
            faces.push(triangle[2].checked_add(base)?);
        }
    }

    Some(MeshBuffer { vertices, faces })
}

/// Index of geometry definitions keyed by solid id
///
/// Built once from the document's graphic section; lookups during traversal
/// return a shared handle or `None`, never an error.
#[derive(Debug, Clone, Default)]
pub struct DefinitionIndex {
    definitions: HashMap<SolidId, Arc<GeometryDefinition>>,
}

impl DefinitionIndex {
    /// Build definitions for every container with usable mesh data
    ///
    /// Containers without mesh data, and containers whose fragments are
    /// malformed, are skipped; they simply yield no definition. When two
    /// containers carry the same id the first one wins.
    ///
    /// # Arguments
    /// * `graphic` - The document's graphic section
    pub fn build(graphic: &Graphic) -> Self {
        let mut definitions: HashMap<SolidId, Arc<GeometryDefinition>> = HashMap::new();

        for container in &graphic.containers {
            if definitions.contains_key(&container.id) {
                warn!(solid = %container.id, "duplicate container id, keeping first definition");
                continue;
            }

            let Some(fragments) = container.meshes.as_deref() else {
                debug!(solid = %container.id, "container carries no mesh data, skipped");
                continue;
            };
            let Some(mesh) = merge_fragments(fragments) else {
                debug!(solid = %container.id, "container has no usable mesh fragments, skipped");
                continue;
            };

            let name = format!("Solid{}", container.id);
            let material = RenderMaterial::new(
                &name,
                container.properties.material.color,
                container.properties.material.opacity,
            );

            debug!(
                solid = %container.id,
                vertices = mesh.vertex_count(),
                triangles = mesh.triangle_count(),
                "built geometry definition"
            );

            definitions.insert(
                container.id,
                Arc::new(GeometryDefinition {
                    name,
                    mesh,
                    material,
                }),
            );
        }

        Self { definitions }
    }

    /// Look up the shared definition for a solid id
    pub fn get(&self, id: SolidId) -> Option<&Arc<GeometryDefinition>> {
        self.definitions.get(&id)
    }

    /// Number of definitions in the index
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no container yielded a definition
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over all definitions in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&SolidId, &Arc<GeometryDefinition>)> {
        self.definitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Container, ContainerProperties, MaterialProperties};

    fn fragment(vertices: Vec<f64>, indices: Vec<u32>) -> MeshFragment {
        MeshFragment {
            vertices: Some(vertices),
            indices: Some(indices),
        }
    }

    fn container(id: u64, meshes: Option<Vec<MeshFragment>>) -> Container {
        Container {
            id: SolidId(id),
            properties: ContainerProperties::default(),
            meshes,
        }
    }

    #[test]
    fn test_merge_rebases_second_fragment() {
        // First fragment: 4 vertices, 2 triangles. Second: 3 vertices, 1
        // triangle. The second fragment's indices must shift by 4.
        let first = fragment(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        let second = fragment(vec![5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 5.0, 1.0, 0.0], vec![0, 1, 2]);

        let mesh = merge_fragments(&[first, second]).unwrap();

        assert_eq!(mesh.vertex_count(), 7);
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(&mesh.faces[0..4], &[3, 0, 1, 2]);
        assert_eq!(&mesh.faces[4..8], &[3, 0, 2, 3]);
        assert_eq!(&mesh.faces[8..12], &[3, 4, 5, 6]);
    }

    #[test]
    fn test_merge_empty_fragment_list() {
        assert!(merge_fragments(&[]).is_none());
    }

    #[test]
    fn test_merge_missing_buffer_disqualifies_container() {
        let good = fragment(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]);
        let no_indices = MeshFragment {
            vertices: Some(vec![0.0, 0.0, 0.0]),
            indices: None,
        };
        let no_vertices = MeshFragment {
            vertices: None,
            indices: Some(vec![0, 1, 2]),
        };

        // The malformed fragment poisons the merge even when another
        // fragment is fine.
        assert!(merge_fragments(&[good.clone(), no_indices]).is_none());
        assert!(merge_fragments(&[no_vertices, good]).is_none());
    }

    #[test]
    fn test_merge_rejects_ragged_vertices() {
        let ragged = fragment(vec![0.0, 0.0, 0.0, 1.0], vec![0, 1, 2]);
        assert!(merge_fragments(&[ragged]).is_none());
    }

    #[test]
    fn test_merge_rejects_index_overflow_on_rebase() {
        let first = fragment(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]);
        // Shifting u32::MAX past the first fragment's three vertices cannot
        // produce a valid index.
        let huge = fragment(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![u32::MAX, 0, 1],
        );
        assert!(merge_fragments(&[first, huge]).is_none());
    }

    #[test]
    fn test_merge_drops_trailing_partial_triple() {
        let frag = fragment(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2, 0, 1],
        );
        let mesh = merge_fragments(&[frag]).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.faces, vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_merge_wellformed_empty_fragment() {
        let mesh = merge_fragments(&[fragment(vec![], vec![])]).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_build_skips_containers_without_geometry() {
        let graphic = Graphic {
            containers: vec![
                container(
                    1,
                    Some(vec![fragment(
                        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                        vec![0, 1, 2],
                    )]),
                ),
                container(2, None),
                container(3, Some(vec![])),
            ],
        };

        let index = DefinitionIndex::build(&graphic);

        assert_eq!(index.len(), 1);
        assert!(index.get(SolidId(1)).is_some());
        assert!(index.get(SolidId(2)).is_none());
        assert!(index.get(SolidId(3)).is_none());
    }

    #[test]
    fn test_build_derives_name_and_material() {
        let mut red = container(
            7,
            Some(vec![fragment(
                vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                vec![0, 1, 2],
            )]),
        );
        red.properties = ContainerProperties {
            material: MaterialProperties {
                color: [255, 0, 0],
                opacity: 1.0,
            },
        };

        let index = DefinitionIndex::build(&Graphic {
            containers: vec![red],
        });

        let definition = index.get(SolidId(7)).unwrap();
        assert_eq!(definition.name, "Solid7");
        assert_eq!(definition.material.name, "Solid7");
        assert_eq!(definition.material.diffuse, -65536);
    }

    #[test]
    fn test_build_keeps_first_on_duplicate_id() {
        let make = |opacity: f64| {
            let mut c = container(
                4,
                Some(vec![fragment(
                    vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                    vec![0, 1, 2],
                )]),
            );
            c.properties = ContainerProperties {
                material: MaterialProperties {
                    color: [0, 0, 0],
                    opacity,
                },
            };
            c
        };

        let index = DefinitionIndex::build(&Graphic {
            containers: vec![make(1.0), make(0.0)],
        });

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(SolidId(4)).unwrap().material.opacity, 1.0);
    }

    #[test]
    fn test_lookups_share_one_definition() {
        let graphic = Graphic {
            containers: vec![container(
                9,
                Some(vec![fragment(
                    vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                    vec![0, 1, 2],
                )]),
            )],
        };

        let index = DefinitionIndex::build(&graphic);
        let a = index.get(SolidId(9)).unwrap().clone();
        let b = index.get(SolidId(9)).unwrap().clone();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
