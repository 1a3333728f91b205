use super::{
    json_pretty, load_request, parse_prefixes, pick_version, spin_fail, spin_ok, spinner,
    target_platform, EXIT_SUCCESS,
};
use kiln_build::{configure_args, resolve_variants, BuildPlan};
use kiln_recipe::Descriptor;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run(
    descriptor: &Descriptor,
    spec: &[String],
    request_file: Option<&Path>,
    platform: Option<&str>,
    prefix_pairs: &[String],
    out: &Path,
    json: bool,
) -> Result<u8, String> {
    let request = load_request(request_file, spec)?;
    let platform = target_platform(&request, platform)?;
    let prefixes = parse_prefixes(prefix_pairs)?;
    let version = pick_version(descriptor, &request)?;

    let pb = if json { None } else { Some(spinner("concretizing build plan...")) };

    let plan = match resolve_variants(descriptor, &request, platform).and_then(|resolved| {
        let args = configure_args(descriptor, &resolved, platform, &prefixes);
        BuildPlan::from_resolved(descriptor, version.id, &resolved, platform, &args)
    }) {
        Ok(plan) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "build plan concretized");
            }
            plan
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "concretization failed");
            }
            return Err(e.to_string());
        }
    };

    plan.write_to_file(out).map_err(|e| format!("plan error: {e}"))?;

    if json {
        let payload = serde_json::json!({
            "plan_id": plan.plan_id,
            "short_id": plan.short_id,
            "package": plan.package,
            "version": plan.version,
            "platform": plan.platform,
            "path": out,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "planned {}@{} for {} ({})",
            plan.package, plan.version, plan.platform, plan.short_id
        );
        println!("wrote {}", out.display());
    }
    Ok(EXIT_SUCCESS)
}
