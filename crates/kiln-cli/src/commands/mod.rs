pub mod completions;
pub mod flags;
pub mod info;
pub mod plan;
pub mod post_install;
pub mod resolve;
pub mod verify;

use indicatif::{ProgressBar, ProgressStyle};
use kiln_build::DependencyPrefixes;
use kiln_recipe::{parse_request_file, BuildRequest, Descriptor, Platform, VersionEntry};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_REQUEST_ERROR: u8 = 2;
pub const EXIT_PLAN_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_value(value: &str) -> String {
    use console::Style;
    match value {
        "true" => Style::new().green().apply_to(value).to_string(),
        "false" => Style::new().dim().apply_to(value).to_string(),
        other => Style::new().cyan().apply_to(other).to_string(),
    }
}

/// Assemble the build request: optional TOML file, then CLI spec tokens on top.
pub fn load_request(file: Option<&Path>, spec: &[String]) -> Result<BuildRequest, String> {
    let mut request = match file {
        Some(path) => parse_request_file(path).map_err(|e| format!("request error: {e}"))?,
        None => BuildRequest::default(),
    };
    request
        .apply_spec_tokens(spec)
        .map_err(|e| format!("request error: {e}"))?;
    Ok(request)
}

/// Platform precedence: CLI flag, then request file, then the host.
pub fn target_platform(
    request: &BuildRequest,
    cli_platform: Option<&str>,
) -> Result<Platform, String> {
    let named = cli_platform.or(request.platform.as_deref());
    match named {
        Some(name) => name
            .parse::<Platform>()
            .map_err(|e| format!("request error: {e}")),
        None => Ok(Platform::host()),
    }
}

/// Version precedence: request, then the registry default.
pub fn pick_version<'d>(
    descriptor: &'d Descriptor,
    request: &BuildRequest,
) -> Result<&'d VersionEntry, String> {
    match request.version.as_deref() {
        Some(id) => descriptor
            .version(id)
            .ok_or_else(|| format!("request error: unknown version '{id}'")),
        None => Ok(descriptor.default_version()),
    }
}

/// Parse `--prefix pkg=path` pairs into dependency install prefixes.
pub fn parse_prefixes(pairs: &[String]) -> Result<DependencyPrefixes, String> {
    let mut prefixes = DependencyPrefixes::new();
    for pair in pairs {
        let Some((package, path)) = pair.split_once('=') else {
            return Err(format!(
                "request error: malformed --prefix '{pair}', expected pkg=path"
            ));
        };
        if package.is_empty() || path.is_empty() {
            return Err(format!(
                "request error: malformed --prefix '{pair}', expected pkg=path"
            ));
        }
        prefixes.insert(package.to_owned(), PathBuf::from(path));
    }
    Ok(prefixes)
}
