use super::{colorize_value, json_pretty, EXIT_SUCCESS};
use kiln_recipe::{Descriptor, Platform, VariantKind};

pub fn run(descriptor: &Descriptor, json: bool) -> Result<u8, String> {
    descriptor.validate().map_err(|e| e.to_string())?;

    if json {
        let build_only: Vec<&str> = descriptor.build_dependencies().map(|e| e.package).collect();
        let payload = serde_json::json!({
            "package": descriptor.name,
            "homepage": descriptor.homepage,
            "generator": descriptor.generator,
            "versions": descriptor.versions,
            "variants": descriptor.variants,
            "dependencies": descriptor.dependencies,
            "build_dependencies": build_only,
            "conflicts": descriptor.conflicts,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("{} — {}", descriptor.name, descriptor.homepage);
    println!("generator: {}", descriptor.generator);

    println!("\nversions:");
    for entry in descriptor.versions {
        match descriptor.archive_url(entry) {
            Some(url) => println!("  {:<12} {url}", entry.id),
            None => println!("  {:<12} (branch of {})", entry.id, descriptor.git),
        }
    }

    println!("\nvariants:");
    for variant in descriptor.variants {
        let default = variant.default_value(Platform::host());
        let domain = match variant.kind {
            VariantKind::Bool { .. } => String::new(),
            VariantKind::Enum { values, .. } => format!(" [{}]", values.join(", ")),
        };
        println!(
            "  {:<14} {}{domain}  {}",
            variant.name,
            colorize_value(&default.to_string()),
            variant.description
        );
    }

    println!("\ndependencies:");
    for edge in descriptor.dependencies {
        println!("  {edge}");
    }

    if !descriptor.conflicts.is_empty() {
        println!("\nconflicts:");
        for conflict in descriptor.conflicts {
            println!(
                "  {} <= {}: {}",
                conflict.compiler, conflict.max_major, conflict.message
            );
        }
    }

    Ok(EXIT_SUCCESS)
}
