use super::{json_pretty, load_request, parse_prefixes, target_platform, EXIT_SUCCESS};
use kiln_build::{configure_args, effective, resolve_variants};
use kiln_recipe::Descriptor;
use std::path::Path;

pub fn run(
    descriptor: &Descriptor,
    spec: &[String],
    request_file: Option<&Path>,
    platform: Option<&str>,
    prefix_pairs: &[String],
    json: bool,
) -> Result<u8, String> {
    let request = load_request(request_file, spec)?;
    let platform = target_platform(&request, platform)?;
    let prefixes = parse_prefixes(prefix_pairs)?;
    let resolved =
        resolve_variants(descriptor, &request, platform).map_err(|e| e.to_string())?;
    let args = configure_args(descriptor, &resolved, platform, &prefixes);

    if json {
        let rendered: Vec<String> = args.iter().map(|d| d.to_arg()).collect();
        let payload = serde_json::json!({
            "package": descriptor.name,
            "platform": platform,
            "generator": descriptor.generator,
            "args": rendered,
            // Last-writer-wins view: one value per define name.
            "effective": effective(&args),
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    for define in &args {
        println!("{}", define.to_arg());
    }
    Ok(EXIT_SUCCESS)
}
