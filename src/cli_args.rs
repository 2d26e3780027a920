// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use hedgemesh_engine::mesh::halfedge::subdivision::SubdivisionScheme;
use hedgemesh_engine::prelude::TraversalQuery;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Loads display, import and operator settings from the given `.ron` file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// A mesh read from an OFF file, edited, and written back as OFF.
#[derive(ClapArgs, Debug)]
pub struct MeshIo {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prints element counts and topological properties of a mesh
    Info { input: PathBuf },
    /// Moves every vertex along its normal. Negative factors deflate
    Inflate {
        #[command(flatten)]
        io: MeshIo,
        #[arg(long, allow_hyphen_values = true)]
        factor: Option<f32>,
    },
    /// Moves every vertex towards the mean of its neighbours
    Smooth {
        #[command(flatten)]
        io: MeshIo,
        #[arg(long)]
        iterations: Option<i32>,
    },
    /// Moves every vertex away from the mean of its neighbours
    Sharpen {
        #[command(flatten)]
        io: MeshIo,
        #[arg(long)]
        iterations: Option<i32>,
    },
    /// Closes every boundary cycle with a fan of triangles
    FillHoles {
        #[command(flatten)]
        io: MeshIo,
    },
    /// Cuts every vertex, replacing it with a new face
    Truncate {
        #[command(flatten)]
        io: MeshIo,
        #[arg(long)]
        factor: Option<f32>,
    },
    /// Splits every face. Without `--scheme`, uses the configured default
    Subdivide {
        #[command(flatten)]
        io: MeshIo,
        #[arg(long, value_enum)]
        scheme: Option<SchemeArg>,
    },
    /// Builds a surface of revolution from a profile file with one `x y`
    /// point per line
    Revolve {
        profile: PathBuf,
        output: PathBuf,
        #[arg(long)]
        angles: Option<u32>,
    },
    /// Writes a primitive shape
    Primitive {
        #[arg(value_enum)]
        shape: PrimitiveArg,
        output: PathBuf,
    },
    /// Runs a neighbourhood query on the vertex or face at `index`
    Traverse {
        input: PathBuf,
        #[arg(value_enum)]
        query: QueryArg,
        index: usize,
    },
    /// Writes the default settings, to be used as a starting point for `--config`
    WriteConfig { output: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeArg {
    Topological,
    Linear,
    Loop,
}

impl From<SchemeArg> for SubdivisionScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Topological => SubdivisionScheme::Topological,
            SchemeArg::Linear => SubdivisionScheme::Linear,
            SchemeArg::Loop => SubdivisionScheme::Loop,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveArg {
    Triangle,
    Tetrahedron,
    Cube,
    Torus,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryArg {
    VertexNeighbors,
    AttachedFaces,
    FaceEdges,
}

impl QueryArg {
    pub fn at(self, index: usize) -> TraversalQuery {
        match self {
            QueryArg::VertexNeighbors => TraversalQuery::VertexNeighbors(index),
            QueryArg::AttachedFaces => TraversalQuery::AttachedFaces(index),
            QueryArg::FaceEdges => TraversalQuery::FaceEdges(index),
        }
    }
}
