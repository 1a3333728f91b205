use super::{colorize_value, json_pretty, load_request, target_platform, EXIT_SUCCESS};
use kiln_build::resolve_variants;
use kiln_recipe::Descriptor;
use std::path::Path;

pub fn run(
    descriptor: &Descriptor,
    spec: &[String],
    request_file: Option<&Path>,
    platform: Option<&str>,
    json: bool,
) -> Result<u8, String> {
    let request = load_request(request_file, spec)?;
    let platform = target_platform(&request, platform)?;
    let resolved =
        resolve_variants(descriptor, &request, platform).map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "package": descriptor.name,
            "platform": platform,
            "variants": resolved,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("{} on {platform}:", descriptor.name);
    for (name, value) in resolved.iter() {
        println!("  {name:<14} {}", colorize_value(&value.to_string()));
    }
    Ok(EXIT_SUCCESS)
}
