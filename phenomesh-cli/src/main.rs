use anyhow::Context;
use clap::Parser;
use phenomesh_cli::MeshBuilder;
use phenomesh_io::write_mesh;
use std::fs;
use std::path::PathBuf;

/// Reconstruct a surface mesh from a registered plant point cloud
#[derive(Parser, Debug)]
#[command(name = "phenomesh", version, about)]
struct Args {
    /// Plot directory holding the registered point cloud
    #[arg(short, long)]
    path: PathBuf,

    /// Output directory where the final mesh will be saved
    #[arg(short, long, default_value = "mesh_out")]
    outdir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    fs::create_dir_all(&args.outdir)
        .with_context(|| format!("creating output directory {}", args.outdir.display()))?;

    let mesh = MeshBuilder::default().build_mesh(&args.path)?;

    let plot = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cloud".to_string());
    let out_path = args.outdir.join(format!("{plot}_mesh.ply"));
    write_mesh(&mesh, &out_path)?;

    println!("Done, see outputs in {}.", args.outdir.display());
    Ok(())
}
