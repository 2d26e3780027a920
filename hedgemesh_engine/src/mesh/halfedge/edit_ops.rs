// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// Moves every vertex along its normal by `factor`. Positive values inflate.
///
/// All normals are computed from the positions before the call, so the
/// result does not depend on vertex order.
pub fn inflate_deflate(mesh: &mut HalfEdgeMesh, factor: f32) -> MeshResult<()> {
    if !factor.is_finite() {
        return Err(MeshError::invalid_parameter(format!(
            "Inflation factor must be a finite number, got {factor}"
        )));
    }
    let normals = mesh.vertex_normals()?;
    let positions = mesh.write_positions();
    for (v, normal) in normals {
        positions[v] += factor * normal;
    }
    Ok(())
}

/// Laplacian of every vertex with neighbours: its offset from the mean of
/// its neighbours.
fn laplacians(mesh: &HalfEdgeMesh) -> MeshResult<Vec<(VertexId, Vec3)>> {
    let mut result = Vec::with_capacity(mesh.num_vertices());
    for (v, _) in mesh.read_connectivity().iter_vertices() {
        let neighbors = mesh.vertex_neighbors(v)?;
        let neighbor_positions = neighbors
            .iter()
            .map(|&w| mesh.position(w))
            .collect::<MeshResult<SVec<Vec3>>>()?;
        if let Some(mean) = mean_point(neighbor_positions) {
            result.push((v, mesh.position(v)? - mean));
        }
    }
    Ok(result)
}

/// One step of Laplacian smoothing (`smooth = true`), which moves every
/// vertex to the mean of its neighbours, or sharpening, which moves it the
/// same distance in the opposite direction. Isolated vertices stay put.
pub fn laplacian_smooth_sharpen(mesh: &mut HalfEdgeMesh, smooth: bool) -> MeshResult<()> {
    let sign = if smooth { -1.0 } else { 1.0 };
    let deltas = laplacians(mesh)?;
    let positions = mesh.write_positions();
    for (v, laplacian) in deltas {
        positions[v] += sign * laplacian;
    }
    Ok(())
}

/// Repeats [`laplacian_smooth_sharpen`] `iterations` times.
pub fn laplacian_smooth_sharpen_iterations(
    mesh: &mut HalfEdgeMesh,
    smooth: bool,
    iterations: i32,
) -> MeshResult<()> {
    if iterations < 0 {
        return Err(MeshError::invalid_parameter(format!(
            "Iteration count cannot be negative, got {iterations}"
        )));
    }
    for _ in 0..iterations {
        laplacian_smooth_sharpen(mesh, smooth)?;
    }
    log::debug!(
        "Applied {iterations} {} steps",
        if smooth { "smoothing" } else { "sharpening" }
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn test_inflate_deflate_roundtrip() {
        let original = primitives::Tetrahedron::build().unwrap();
        let mut mesh = original.clone();
        mesh.mark_clean();

        inflate_deflate(&mut mesh, 0.25).unwrap();
        assert!(mesh.is_dirty());
        for (v, _) in mesh.read_connectivity().iter_vertices() {
            let before = original.position(v).unwrap();
            let after = mesh.position(v).unwrap();
            approx::assert_relative_eq!(after.length(), before.length() + 0.25, epsilon = 1e-5);
        }

        inflate_deflate(&mut mesh, -0.25).unwrap();
        for (v, _) in mesh.read_connectivity().iter_vertices() {
            assert!(mesh
                .position(v)
                .unwrap()
                .abs_diff_eq(original.position(v).unwrap(), 1e-5));
        }
        assert_eq!(mesh.num_halfedges(), original.num_halfedges());
    }

    #[test]
    pub fn test_inflate_rejects_nan() {
        let mut mesh = primitives::Tetrahedron::build().unwrap();
        assert!(matches!(
            inflate_deflate(&mut mesh, f32::NAN),
            Err(MeshError::InvalidParameter { .. })
        ));
    }

    #[test]
    pub fn test_smoothing_moves_to_neighbour_mean() {
        let mut mesh = primitives::Tetrahedron::build().unwrap();
        let v = mesh.vertex_at_index(0).unwrap();
        let expected = mean_point(
            mesh.vertex_neighbors(v)
                .unwrap()
                .iter()
                .map(|&w| mesh.position(w).unwrap()),
        )
        .unwrap();

        laplacian_smooth_sharpen(&mut mesh, true).unwrap();
        assert!(mesh.position(v).unwrap().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    pub fn test_smooth_then_sharpen_scales() {
        // For a regular tetrahedron, the mean of the other three vertices of
        // a vertex p is -p / 3
        let original = primitives::Tetrahedron::build().unwrap();
        let mut mesh = original.clone();
        laplacian_smooth_sharpen(&mut mesh, false).unwrap();
        for (v, _) in mesh.read_connectivity().iter_vertices() {
            let p = original.position(v).unwrap();
            let expected = p + (p + p / 3.0);
            assert!(mesh.position(v).unwrap().abs_diff_eq(expected, 1e-5));
        }
    }

    #[test]
    pub fn test_iterations() {
        let mut mesh = primitives::Tetrahedron::build().unwrap();
        let before = mesh.clone();
        laplacian_smooth_sharpen_iterations(&mut mesh, true, 0).unwrap();
        assert_eq!(
            mesh.positions().values().collect_vec(),
            before.positions().values().collect_vec()
        );
        assert!(matches!(
            laplacian_smooth_sharpen_iterations(&mut mesh, true, -1),
            Err(MeshError::InvalidParameter { .. })
        ));

        // Smoothing shrinks a convex shape towards its centroid
        laplacian_smooth_sharpen_iterations(&mut mesh, true, 3).unwrap();
        let v = mesh.vertex_at_index(0).unwrap();
        let p_before = before.position(v).unwrap();
        assert!(mesh.position(v).unwrap().length() < p_before.length());
    }
}
