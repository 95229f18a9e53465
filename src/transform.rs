//! Homogeneous transform construction and path composition
//!
//! This module turns per-node coordinate systems into 4x4 affine matrices and
//! composes them along a root-to-leaf path:
//! - Building a local matrix from an origin plus three axis vectors
//! - Right-multiplying local matrices in root-to-leaf order
//! - Flattening a matrix into the row-major layout the scene output uses
//!
//! Composition never fails: a path entry that resolves to no node, or to a
//! node without a coordinate system, contributes an identity factor.

use nalgebra::Matrix4;

use crate::document::{CoordinateSystem, Node, NodeId, StructureTree};

/// Build the local placement matrix of a coordinate system
///
/// The columns of the result are the x, y and z axes followed by the origin,
/// with a `[0, 0, 0, 1]` bottom row (standard homogeneous affine form). Axes
/// are trusted as given; no normalization or orthogonality check is applied.
///
/// # Arguments
/// * `csys` - The coordinate system to convert
///
/// # Returns
/// The 4x4 placement matrix
///
/// # Example
/// ```
/// use cadscene::document::CoordinateSystem;
/// use cadscene::transform::build_local_matrix;
///
/// let csys = CoordinateSystem::from([
///     [1.0, 2.0, 3.0], // origin
///     [1.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, 0.0, 1.0],
/// ]);
/// let m = build_local_matrix(&csys);
/// assert_eq!(m[(0, 3)], 1.0);
/// assert_eq!(m[(1, 3)], 2.0);
/// assert_eq!(m[(2, 3)], 3.0);
/// assert_eq!(m[(3, 3)], 1.0);
/// ```
pub fn build_local_matrix(csys: &CoordinateSystem) -> Matrix4<f64> {
    let p = csys.origin;
    let x = csys.x_axis;
    let y = csys.y_axis;
    let z = csys.z_axis;

    Matrix4::new(
        x[0], y[0], z[0], p[0], //
        x[1], y[1], z[1], p[1], //
        x[2], y[2], z[2], p[2], //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Compute the local placement matrix of a node, if it has one
///
/// A pure lookup on the node's optional coordinate system; the tree is never
/// mutated. Nodes without a coordinate system have no local matrix and
/// contribute identity during composition.
///
/// # Arguments
/// * `node` - The node whose placement to compute
///
/// # Returns
/// The placement matrix, or `None` when the node carries no coordinate system
pub fn compute_local_matrix(node: &Node) -> Option<Matrix4<f64>> {
    node.coordinate_system.as_ref().map(build_local_matrix)
}

/// Compose the cumulative transform along a root-to-leaf path
///
/// Starts from identity and right-multiplies each path node's local matrix in
/// order, so the root-most matrix is applied first and the result maps
/// leaf-local coordinates into root space. Path entries that resolve to no
/// node, and nodes without a coordinate system, are skipped.
///
/// # Arguments
/// * `tree` - Node registry the path ids are resolved against
/// * `path` - Node ids in root-to-leaf order, including the leaf itself
///
/// # Returns
/// The composed 4x4 transform
pub fn compose_path(tree: &StructureTree, path: &[NodeId]) -> Matrix4<f64> {
    let mut matrix = Matrix4::identity();

    for &id in path {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let Some(local) = compute_local_matrix(node) else {
            continue;
        };
        matrix = matrix * local;
    }

    matrix
}

/// Flatten a matrix into 16 values in row-major order
///
/// nalgebra stores matrices column-major; the scene output expects the
/// row-major layout, so this reads entries row by row.
///
/// # Arguments
/// * `matrix` - The matrix to flatten
///
/// # Returns
/// The 16 entries, rows first
pub fn flatten_row_major(matrix: &Matrix4<f64>) -> [f64; 16] {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[row * 4 + col] = matrix[(row, col)];
        }
    }
    out
}
