//! Mesh Tool: loads or creates a patch mesh, prints a summary and saves it.
//!
//! Usage:
//! ```text
//! cargo run --example mesh_tool                          # new two-patch mesh
//! cargo run --example mesh_tool -- in.mesh               # summarize a file
//! cargo run --example mesh_tool -- in.mesh out.mesh      # summarize and save
//! ```

use patchmesh::operations::continuity::Continuity;
use patchmesh::math::Vector3;
use patchmesh::topology::Direction;
use patchmesh::{Document, Result};

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for patchmesh.
    // Override with RUST_LOG env var (e.g. RUST_LOG=patchmesh=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("mesh_tool=info".parse().unwrap_or_default())
        .add_directive("patchmesh=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut doc = Document::new();
    match args.first() {
        Some(path) => doc.load(path)?,
        None => build_sample(&mut doc)?,
    }

    print_summary(&doc);

    if let Some(out) = args.get(1) {
        doc.save(out)?;
        println!("saved to {out}");
    } else if args.is_empty() {
        let out = std::env::temp_dir().join("mesh_tool_sample.mesh");
        doc.save(&out)?;
        println!("saved to {}", out.display());
    }
    Ok(())
}

/// Two patches side by side, joined along their common edge and bent with
/// C1 continuity.
fn build_sample(doc: &mut Document) -> Result<()> {
    let left = doc.create_default_patch()?;
    let right = doc.create_default_patch()?;
    let corner = doc.store().patch(right)?.points[0];
    doc.move_patch_group(corner, Vector3::new(1.0, 0.0, 0.0))?;
    doc.attach(Direction::Right, left, right)?;

    doc.set_continuity(Continuity::C1);
    let handle = doc.store().patch(left)?.points[6];
    doc.move_point(handle, Vector3::new(0.0, 0.0, 0.5))?;
    Ok(())
}

fn print_summary(doc: &Document) {
    let store = doc.store();
    println!(
        "{} patches, {} points, scale {}",
        store.patch_count(),
        store.point_count(),
        doc.header().scale
    );
    for (index, name) in doc.patch_names().into_iter().enumerate() {
        let Some(id) = store.patch_at(index) else {
            continue;
        };
        let links: Vec<String> = store
            .patch(id)
            .map(|p| {
                p.linked()
                    .filter_map(|(d, n)| {
                        let other = store.patch(n).ok()?;
                        Some(format!("{}={}", d.label(), other.name))
                    })
                    .collect()
            })
            .unwrap_or_default();
        println!("  {name}: {}", links.join(" "));
    }
    match store.validate() {
        Ok(()) => println!("topology ok"),
        Err(e) => println!("topology broken: {e}"),
    }
}
