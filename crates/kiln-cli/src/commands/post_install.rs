use super::{json_pretty, EXIT_SUCCESS};
use kiln_build::install_bindings;
use kiln_recipe::Descriptor;
use std::path::Path;

pub fn run(
    descriptor: &Descriptor,
    source: &Path,
    platlib: &Path,
    json: bool,
) -> Result<u8, String> {
    let count = install_bindings(source, descriptor.bindings_subdir, platlib)
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "package": descriptor.name,
            "files": count,
            "platlib": platlib,
            "status": "installed"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("installed {count} binding files into {}", platlib.display());
    }
    Ok(EXIT_SUCCESS)
}
