// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reading and writing of the OFF face / vertex list format:
//!
//! ```text
//! OFF
//! V F E
//! x y z [r g b [a]]    (V lines)
//! k i0 i1 ... ik-1     (F lines)
//! ```
//!
//! `#` starts a comment. Colors above 1 are read as 0-255 values.

use std::io::Write;
use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{space0, space1, u64 as number},
    combinator::{map, opt},
    multi::{length_count, separated_list1},
    number::complete::double,
    sequence::{preceded, tuple},
    IResult, Parser,
};

use crate::prelude::*;

struct Counts {
    vertices: usize,
    faces: usize,
}

fn counts(input: &str) -> IResult<&str, Counts> {
    map(
        tuple((number, preceded(space1, number), opt(preceded(space1, number)))),
        |(vertices, faces, _edges)| Counts {
            vertices: vertices as usize,
            faces: faces as usize,
        },
    )
    .parse(input)
}

/// The keyword line. Some writers put the counts on the same line.
fn header(input: &str) -> IResult<&str, Option<Counts>> {
    map(
        tuple((alt((tag("COFF"), tag("OFF"))), opt(preceded(space1, counts)))),
        |(_, counts)| counts,
    )
    .parse(input)
}

fn vertex_values(input: &str) -> IResult<&str, Vec<f64>> {
    separated_list1(space1, double).parse(input)
}

/// A face line. Anything after the indices (usually a face color) is ignored.
fn face_indices(input: &str) -> IResult<&str, Vec<usize>> {
    map(
        length_count(number, preceded(space1, number)),
        |indices: Vec<u64>| indices.into_iter().map(|i| i as usize).collect(),
    )
    .parse(input)
}

/// Non-empty lines with comments removed, along with their 1-based line
/// number.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let line = line.trim();
        (!line.is_empty()).then(|| (i + 1, line))
    })
}

fn parse_line<'a, T>(
    line_number: usize,
    line: &'a str,
    what: &str,
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> MeshResult<(&'a str, T)> {
    tuple((parser, space0))
        .parse(line)
        .map(|(rest, (value, _))| (rest, value))
        .map_err(|err| MeshError::parse(line_number, format!("Could not read {what}: {err}")))
}

/// Parses OFF text into a polygon mesh. No orientation or centering is done
/// here.
pub fn parse_off(text: &str) -> MeshResult<PolygonMesh> {
    let mut lines = content_lines(text);
    let mut last_line = 0;
    let mut next_line = |what: &str| {
        let next = lines.next();
        if let Some((n, _)) = next {
            last_line = n;
        }
        next.ok_or_else(|| {
            MeshError::parse(last_line + 1, format!("Unexpected end of file, expected {what}"))
        })
    };

    let (n, first) = next_line("the OFF header")?;
    let counts = if first.starts_with("OFF") || first.starts_with("COFF") {
        let (_, inline_counts) = parse_line(n, first, "the OFF header", header)?;
        match inline_counts {
            Some(counts) => counts,
            None => {
                let (n, line) = next_line("the element counts")?;
                parse_line(n, line, "the element counts", counts)?.1
            }
        }
    } else {
        parse_line(n, first, "the element counts", counts)?.1
    };

    let mut positions = Vec::new();
    let mut colors = Vec::new();
    for i in 0..counts.vertices {
        let (n, line) = next_line(&format!("vertex {i}"))?;
        let (rest, values) = parse_line(n, line, "vertex", vertex_values)?;
        if !rest.is_empty() {
            return Err(MeshError::parse(n, format!("Unexpected text after vertex: {rest}")));
        }
        if values.len() < 3 {
            return Err(MeshError::parse(
                n,
                format!("A vertex needs three coordinates, found {}", values.len()),
            ));
        }
        positions.push(Vec3::new(values[0] as f32, values[1] as f32, values[2] as f32));

        let color = if values.len() >= 6 {
            let color = Vec3::new(values[3] as f32, values[4] as f32, values[5] as f32);
            if color.max_element() > 1.0 {
                color / 255.0
            } else {
                color
            }
        } else {
            DEFAULT_COLOR
        };
        colors.push(color);
    }

    let mut faces = Vec::new();
    for i in 0..counts.faces {
        let (n, line) = next_line(&format!("face {i}"))?;
        let (_, indices) = parse_line(n, line, "face", face_indices)?;
        if indices.len() < 3 {
            return Err(MeshError::parse(
                n,
                format!("A face needs at least three vertices, found {}", indices.len()),
            ));
        }
        if let Some(idx) = indices.iter().find(|&&idx| idx >= counts.vertices) {
            return Err(MeshError::parse(
                n,
                format!("Vertex index {idx} out of range, there are {} vertices", counts.vertices),
            ));
        }
        faces.push(indices.into_iter().collect_svec());
    }

    log::debug!(
        "Read OFF data with {} vertices and {} faces",
        positions.len(),
        faces.len()
    );
    Ok(PolygonMesh {
        positions,
        colors,
        faces,
    })
}

/// Writes the mesh in OFF format, with vertex colors. Vertices and faces are
/// written in insertion order.
pub fn write_off(mesh: &HalfEdgeMesh, mut writer: impl Write) -> anyhow::Result<()> {
    let polygons = PolygonMesh::from_halfedge(mesh)?;
    writeln!(writer, "OFF")?;
    writeln!(
        writer,
        "{} {} {}",
        polygons.positions.len(),
        polygons.faces.len(),
        mesh.num_edges()
    )?;
    for (p, c) in polygons.positions.iter().zip(&polygons.colors) {
        writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, c.x, c.y, c.z)?;
    }
    for face in &polygons.faces {
        writeln!(writer, "{} {}", face.len(), face.iter().join(" "))?;
    }
    Ok(())
}

pub fn load_off(path: impl AsRef<Path>, options: &ImportOptions) -> anyhow::Result<HalfEdgeMesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read OFF file {}", path.display()))?;
    let mesh = HalfEdgeMesh::from_off_str_with(&text, options)
        .with_context(|| format!("Could not load OFF file {}", path.display()))?;
    Ok(mesh)
}

pub fn save_off(mesh: &HalfEdgeMesh, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Could not create OFF file {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_off(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

impl HalfEdgeMesh {
    /// Reads a mesh from OFF text with the default import options.
    pub fn from_off_str(text: &str) -> MeshResult<Self> {
        Self::from_off_str_with(text, &ImportOptions::default())
    }

    pub fn from_off_str_with(text: &str, options: &ImportOptions) -> MeshResult<Self> {
        parse_off(text)?.import(options)
    }

    pub fn to_off_string(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        write_off(self, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TETRAHEDRON: &str = "\
OFF
# A tetrahedron with colored vertices
4 4 6
1 1 1 255 0 0
1 -1 -1 0 255 0
-1 1 -1 0 0 255
-1 -1 1
3 0 1 2
3 0 3 1
3 0 2 3
3 1 3 2
";

    #[test]
    pub fn test_parse_off() {
        let polygons = parse_off(TETRAHEDRON).unwrap();
        assert_eq!(polygons.positions.len(), 4);
        assert_eq!(polygons.faces.len(), 4);
        assert_eq!(polygons.positions[1], Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(polygons.colors[0], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(polygons.colors[3], DEFAULT_COLOR);
        assert_eq!(polygons.faces[3].as_slice(), &[1, 3, 2]);
    }

    #[test]
    pub fn test_counts_on_header_line() {
        let text = "COFF 3 1 3\n0 0 0 0.2 0.4 0.6 1\n1 0 0\n0 1 0\n3 0 1 2 0.5 0.5 0.5\n";
        let polygons = parse_off(text).unwrap();
        assert_eq!(polygons.positions.len(), 3);
        assert!(polygons.colors[0].abs_diff_eq(Vec3::new(0.2, 0.4, 0.6), 1e-6));
        assert_eq!(polygons.faces[0].as_slice(), &[0, 1, 2]);
    }

    #[test]
    pub fn test_parse_errors_report_lines() {
        // Vertex line with too few coordinates
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0\n0 1 0\n3 0 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 4, .. }));

        // Garbage in a vertex line
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 zero\n0 1 0\n3 0 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 4, .. }));

        // Out of range index
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 5\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 6, .. }));

        // Missing face
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 6, .. }));

        // Face shorter than it claims
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 6, .. }));
    }

    #[test]
    pub fn test_huge_counts_are_parse_errors() {
        // Counts come from the file, so they may be anything
        let err = parse_off("OFF\n18446744073709551615 1 0\n0 0 0\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 4, .. }));

        let err =
            parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n18446744073709551615 0 1 2\n")
                .unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 6, .. }));
    }

    #[test]
    pub fn test_off_roundtrip() {
        let mesh = HalfEdgeMesh::from_off_str(TETRAHEDRON).unwrap();
        let text = mesh.to_off_string().unwrap();
        assert!(text.starts_with("OFF\n4 4 6\n"));

        // The tetrahedron is already centered, so positions survive as they are
        let reloaded = HalfEdgeMesh::from_off_str(&text).unwrap();
        assert_eq!(
            PolygonMesh::from_halfedge(&reloaded).unwrap(),
            PolygonMesh::from_halfedge(&mesh).unwrap()
        );
        assert_eq!(reloaded.genus().unwrap(), 0);
    }

    #[test]
    pub fn test_import_options() {
        let text = "OFF\n3 1 0\n1 1 0\n3 1 0\n1 3 0\n3 0 1 2\n";
        let centered = HalfEdgeMesh::from_off_str(text).unwrap();
        let v = centered.vertex_at_index(0).unwrap();
        assert!(centered.position(v).unwrap().abs_diff_eq(Vec3::new(-2.0 / 3.0, -2.0 / 3.0, 0.0), 1e-6));

        let options = ImportOptions {
            center_at_centroid: false,
            ..Default::default()
        };
        let raw = HalfEdgeMesh::from_off_str_with(text, &options).unwrap();
        let v = raw.vertex_at_index(0).unwrap();
        assert_eq!(raw.position(v).unwrap(), Vec3::new(1.0, 1.0, 0.0));
    }
}
