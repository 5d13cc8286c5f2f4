mod builder;
mod meta;
mod parser;

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;
use mesh_format::mesh::MeshData;

use self::meta::ObjMeta;

fn parse(path: &Path, meta: ObjMeta) -> Result<MeshData> {
    Ok(parser::parse(path, meta)?.build_mesh()?)
}

fn serialize(mesh: &MeshData) -> Result<Vec<u8>> {
    mesh.to_bytes().context("Could not serialize mesh data")
}

fn save(path: &Path, output_dir: &Path, data: Vec<u8>) -> Result<()> {
    let target = output_dir.join(format!("{}.msh", file_stem(path)?));
    fs::write(&target, data)
        .with_context(|| format!("Could not write file: {}", target.display()))?;
    Ok(())
}

fn file_stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .ok_or_else(|| anyhow!("No file stem found"))?
        .to_str()
        .ok_or_else(|| anyhow!("Can't convert file stem to string"))
}

/// Meta is read from a file named after the mesh (`<stem>.toml`) or
/// alternatively from a folder scoped meta file named `obj.toml`, falling
/// back to the defaults.
fn load_meta(path: &Path) -> Result<ObjMeta> {
    let dir = path
        .parent()
        .with_context(|| format!("Path terminates in root or prefix: {}", path.display()))?;

    let file_meta = dir.join(format!("{}.toml", file_stem(path)?));
    if file_meta.is_file() {
        return ObjMeta::parse(&file_meta);
    }

    let folder_meta = dir.join("obj.toml");
    if folder_meta.is_file() {
        return ObjMeta::parse(&folder_meta);
    }

    Ok(ObjMeta::default())
}

pub(crate) fn process(path: &Path, output_dir: &Path) -> Result<()> {
    info!("Processing Wavefront `.obj`-file: `{}`", path.display());
    let meta = load_meta(path)?;
    let mesh = parse(path, meta)?;
    info!(
        "Converted `{}`: {} vertices, {} indices",
        path.display(),
        mesh.vertices.len(),
        mesh.index_count()
    );
    save(path, output_dir, serialize(&mesh)?)
}
