use super::{json_pretty, EXIT_SUCCESS};
use kiln_build::BuildPlan;
use std::path::Path;

pub fn run(plan_path: &Path, json: bool) -> Result<u8, String> {
    let plan = BuildPlan::read_from_file(plan_path).map_err(|e| format!("plan error: {e}"))?;
    plan.verify_integrity().map_err(|e| format!("plan error: {e}"))?;

    if json {
        let payload = serde_json::json!({
            "plan_id": plan.plan_id,
            "short_id": plan.short_id,
            "package": plan.package,
            "version": plan.version,
            "status": "verified"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "plan {} verified ({}@{})",
            plan.short_id, plan.package, plan.version
        );
    }
    Ok(EXIT_SUCCESS)
}
