// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use hedgemesh_engine::mesh::halfedge::{edit_ops, primitives, truncation};
use hedgemesh_engine::prelude::*;

/// Command line argument definitions
mod cli_args;
use cli_args::{Args, Command, MeshIo, PrimitiveArg};

fn load(path: &Path, config: &EngineConfig) -> Result<HalfEdgeMesh> {
    let mesh = off_format::load_off(path, &config.import)?;
    log::info!(
        "Loaded {} with {} vertices and {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

fn save(mesh: &HalfEdgeMesh, path: &Path) -> Result<()> {
    off_format::save_off(mesh, path)?;
    log::info!(
        "Wrote {} with {} vertices and {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(())
}

fn print_info(mesh: &HalfEdgeMesh) -> Result<()> {
    println!("vertices: {}", mesh.num_vertices());
    println!("faces: {}", mesh.num_faces());
    println!("edges: {}", mesh.num_edges());
    println!("boundary cycles: {}", mesh.boundary_cycles()?.len());
    println!("connected components: {}", mesh.connected_components()?);
    println!("euler characteristic: {}", mesh.euler_characteristic());
    match mesh.genus()? {
        -1 => println!("genus: undefined"),
        genus => println!("genus: {genus}"),
    }
    Ok(())
}

fn smooth_sharpen(io: &MeshIo, smooth: bool, iterations: i32, config: &EngineConfig) -> Result<()> {
    let mut mesh = load(&io.input, config)?;
    edit_ops::laplacian_smooth_sharpen_iterations(&mut mesh, smooth, iterations)?;
    save(&mesh, &io.output)
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let defaults = &config.operators;

    match args.command {
        Command::Info { input } => print_info(&load(&input, &config)?)?,
        Command::Inflate { io, factor } => {
            let mut mesh = load(&io.input, &config)?;
            edit_ops::inflate_deflate(&mut mesh, factor.unwrap_or(defaults.inflation_factor))?;
            save(&mesh, &io.output)?;
        }
        Command::Smooth { io, iterations } => {
            smooth_sharpen(&io, true, iterations.unwrap_or(defaults.smoothing_iterations), &config)?
        }
        Command::Sharpen { io, iterations } => smooth_sharpen(
            &io,
            false,
            iterations.unwrap_or(defaults.smoothing_iterations),
            &config,
        )?,
        Command::FillHoles { io } => {
            let mesh = load(&io.input, &config)?;
            save(&mesh.fill_holes()?, &io.output)?;
        }
        Command::Truncate { io, factor } => {
            let mesh = load(&io.input, &config)?;
            let truncated =
                truncation::truncate(&mesh, factor.unwrap_or(defaults.truncation_factor))?;
            save(&truncated, &io.output)?;
        }
        Command::Subdivide { io, scheme } => {
            let mesh = load(&io.input, &config)?;
            let scheme = scheme.map(Into::into).unwrap_or(defaults.subdivision_scheme);
            save(&scheme.apply(&mesh)?, &io.output)?;
        }
        Command::Revolve {
            profile,
            output,
            angles,
        } => {
            let text = std::fs::read_to_string(&profile)
                .with_context(|| format!("Could not read profile {}", profile.display()))?;
            let curve = primitives::ProfileCurve::parse(&text)?;
            let mesh = primitives::SurfaceOfRevolution::build(
                &curve,
                angles.unwrap_or(defaults.revolution_angles),
            )?;
            save(&mesh, &output)?;
        }
        Command::Primitive { shape, output } => {
            let mesh = match shape {
                PrimitiveArg::Triangle => primitives::Triangle::build()?,
                PrimitiveArg::Tetrahedron => primitives::Tetrahedron::build()?,
                PrimitiveArg::Cube => primitives::Cube::build(Vec3::ZERO, Vec3::ONE)?,
                PrimitiveArg::Torus => primitives::Torus::build(1.0, 0.25, 24)?,
            };
            save(&mesh, &output)?;
        }
        Command::Traverse {
            input,
            query,
            index,
        } => {
            let mesh = load(&input, &config)?;
            let result = query.at(index).run(&mesh)?;
            println!("{}", result.describe(&mesh)?);
        }
        Command::WriteConfig { output } => {
            config.save(&output)?;
            log::info!("Wrote settings to {}", output.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    #[cfg(feature = "tracy")]
    let _client = profiling::tracy_client::Client::start();

    // Setup logging
    env_logger::init();

    run(Args::parse())
}
