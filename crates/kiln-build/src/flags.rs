use crate::resolve::ResolvedVariants;
use kiln_recipe::{Descriptor, Platform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Install prefixes of resolved dependencies, supplied by the host engine.
/// Keyed by package name.
pub type DependencyPrefixes = BTreeMap<String, PathBuf>;

/// One define handed to the external build-configuration step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: DefineValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DefineValue {
    Bool(bool),
    Str(String),
    Path(PathBuf),
}

impl Define {
    fn on(name: &str) -> Self {
        Self { name: name.to_owned(), value: DefineValue::Bool(true) }
    }

    fn flag(name: &str, value: bool) -> Self {
        Self { name: name.to_owned(), value: DefineValue::Bool(value) }
    }

    fn string(name: &str, value: impl Into<String>) -> Self {
        Self { name: name.to_owned(), value: DefineValue::Str(value.into()) }
    }

    fn path(name: &str, value: impl Into<PathBuf>) -> Self {
        Self { name: name.to_owned(), value: DefineValue::Path(value.into()) }
    }

    /// Render as a `-DNAME=VALUE` command-line argument.
    pub fn to_arg(&self) -> String {
        format!("-D{self}")
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            DefineValue::Bool(true) => write!(f, "{}=ON", self.name),
            DefineValue::Bool(false) => write!(f, "{}=OFF", self.name),
            DefineValue::Str(s) => write!(f, "{}={s}", self.name),
            DefineValue::Path(p) => write!(f, "{}={}", self.name, p.display()),
        }
    }
}

/// Translate resolved variant state into the ordered configure defines.
///
/// Pure and deterministic: the same inputs always produce the same sequence.
/// The output is an ordered list, not a map; duplicate names are expected
/// (the external build system takes the last definition).
///
/// The accelerator blocks are gated on the resolved variant state. The
/// darwin block comes last so its forced `USE_METAL=ON` overrides the
/// variant-derived define.
pub fn configure_args(
    descriptor: &Descriptor,
    resolved: &ResolvedVariants,
    platform: Platform,
    prefixes: &DependencyPrefixes,
) -> Vec<Define> {
    let mut args = Vec::new();

    if resolved.enabled("cuda") {
        args.push(prefix_define("USE_CUDA", "cuda", prefixes));
        args.push(Define::on("USE_CUBLAS"));
        args.push(Define::on("USE_CUDNN"));
    }

    if resolved.enabled("opencl") {
        args.push(prefix_define("USE_OPENCL", "opencl", prefixes));
    }

    // Fixed baseline, emitted regardless of variant state.
    args.push(Define::on("USE_RPC"));
    args.push(Define::flag("USE_CPP_RPC", false));
    args.push(Define::on("USE_SORT"));
    args.push(Define::on("USE_RANDOM"));
    args.push(Define::on("USE_PROFILER"));

    // Defines mirroring resolved variant state.
    for (flag, variant) in DERIVED_FLAGS {
        args.push(Define::flag(flag, resolved.enabled(variant)));
    }

    args.push(Define::on("INSTALL_DEV"));
    if let Some(build_type) = resolved.value("build_type").and_then(|v| v.as_str()) {
        args.push(Define::string("CMAKE_BUILD_TYPE", build_type));
    }

    if platform == Platform::Darwin {
        args.push(Define::on("USE_METAL"));
    }

    debug!(count = args.len(), platform = %platform, "translated configure args");
    args
}

/// Variant-derived boolean defines, in emission order.
const DERIVED_FLAGS: &[(&str, &str)] = &[
    ("USE_LLVM", "llvm"),
    ("USE_ROCM", "rocm"),
    ("USE_AOCL", "aocl"),
    ("USE_METAL", "metal"),
    ("USE_OPENGL", "opengl"),
    ("USE_MICRO", "micro"),
    ("USE_RPC", "rpc"),
    ("USE_CPP_RPC", "cpp_rpc"),
    ("USE_IOS_RPC", "ios_rpc"),
    ("USE_LIBBACKTRACE", "libbacktrace"),
];

/// Accelerator define valued at the dependency's install prefix. When the
/// host supplied no prefix the define degrades to a plain enable.
fn prefix_define(flag: &str, package: &str, prefixes: &DependencyPrefixes) -> Define {
    match prefixes.get(package) {
        Some(prefix) => Define::path(flag, prefix.clone()),
        None => Define::on(flag),
    }
}

/// Effective value per define name once last-writer-wins is applied.
pub fn effective(args: &[Define]) -> BTreeMap<&str, &DefineValue> {
    let mut map = BTreeMap::new();
    for define in args {
        map.insert(define.name.as_str(), &define.value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_variants;
    use kiln_recipe::{parse_spec_tokens, BuildRequest};

    fn resolved(tokens: &[&str], platform: Platform) -> ResolvedVariants {
        let owned: Vec<String> = tokens.iter().map(|s| (*s).to_owned()).collect();
        let request = if owned.is_empty() {
            BuildRequest::default()
        } else {
            parse_spec_tokens(&owned).unwrap()
        };
        resolve_variants(Descriptor::tvm(), &request, platform).unwrap()
    }

    fn all_off() -> Vec<String> {
        Descriptor::tvm()
            .variants
            .iter()
            .filter(|v| v.is_bool())
            .map(|v| format!("~{}", v.name))
            .collect()
    }

    #[test]
    fn baseline_is_always_emitted() {
        let request = parse_spec_tokens(&all_off()).unwrap();
        let state = resolve_variants(Descriptor::tvm(), &request, Platform::Linux).unwrap();
        let args = configure_args(Descriptor::tvm(), &state, Platform::Linux, &BTreeMap::new());

        let rendered: Vec<String> = args.iter().map(Define::to_arg).collect();
        for baseline in ["-DUSE_SORT=ON", "-DUSE_RANDOM=ON", "-DUSE_PROFILER=ON"] {
            assert!(rendered.contains(&baseline.to_owned()), "{baseline}");
        }
        // No accelerator prefix defines, and nothing derived is ON
        assert!(!rendered.iter().any(|a| a.starts_with("-DUSE_CUDA")));
        assert!(!rendered.iter().any(|a| a.starts_with("-DUSE_OPENCL")));
        let eff = effective(&args);
        for (flag, _) in DERIVED_FLAGS {
            assert_eq!(eff[flag], &DefineValue::Bool(false), "{flag}");
        }
    }

    #[test]
    fn derived_defines_mirror_variant_state() {
        let state = resolved(&["+rocm", "+micro", "~llvm"], Platform::Linux);
        let args = configure_args(Descriptor::tvm(), &state, Platform::Linux, &BTreeMap::new());
        let eff = effective(&args);

        assert_eq!(eff["USE_ROCM"], &DefineValue::Bool(true));
        assert_eq!(eff["USE_MICRO"], &DefineValue::Bool(true));
        assert_eq!(eff["USE_LLVM"], &DefineValue::Bool(false));
        assert_eq!(eff["USE_LIBBACKTRACE"], &DefineValue::Bool(true));
    }

    #[test]
    fn cuda_block_is_gated_on_the_variant() {
        let off = resolved(&[], Platform::Linux);
        let args = configure_args(Descriptor::tvm(), &off, Platform::Linux, &BTreeMap::new());
        assert!(!args.iter().any(|d| d.name == "USE_CUDNN"));

        let on = resolved(&["+cuda"], Platform::Linux);
        let mut prefixes = BTreeMap::new();
        prefixes.insert("cuda".to_owned(), PathBuf::from("/opt/cuda-11.4"));
        let args = configure_args(Descriptor::tvm(), &on, Platform::Linux, &prefixes);

        assert_eq!(args[0].to_arg(), "-DUSE_CUDA=/opt/cuda-11.4");
        assert_eq!(args[1].to_arg(), "-DUSE_CUBLAS=ON");
        assert_eq!(args[2].to_arg(), "-DUSE_CUDNN=ON");
    }

    #[test]
    fn opencl_prefix_define_gated_on_the_variant() {
        let on = resolved(&["+opencl"], Platform::Linux);
        let mut prefixes = BTreeMap::new();
        prefixes.insert("opencl".to_owned(), PathBuf::from("/opt/pocl"));
        let args = configure_args(Descriptor::tvm(), &on, Platform::Linux, &prefixes);
        assert_eq!(args[0].to_arg(), "-DUSE_OPENCL=/opt/pocl");
    }

    #[test]
    fn missing_prefix_degrades_to_enable() {
        let on = resolved(&["+cuda"], Platform::Linux);
        let args = configure_args(Descriptor::tvm(), &on, Platform::Linux, &BTreeMap::new());
        assert_eq!(args[0].to_arg(), "-DUSE_CUDA=ON");
    }

    #[test]
    fn darwin_forces_metal_on_even_when_disabled() {
        let state = resolved(&["~metal"], Platform::Darwin);
        let args = configure_args(Descriptor::tvm(), &state, Platform::Darwin, &BTreeMap::new());

        // The variant-derived define says OFF, the trailing platform
        // override says ON, and last writer wins.
        let metal_values: Vec<&DefineValue> = args
            .iter()
            .filter(|d| d.name == "USE_METAL")
            .map(|d| &d.value)
            .collect();
        assert_eq!(metal_values.len(), 2);
        assert_eq!(metal_values[0], &DefineValue::Bool(false));
        assert_eq!(metal_values[1], &DefineValue::Bool(true));
        assert_eq!(effective(&args)["USE_METAL"], &DefineValue::Bool(true));
    }

    #[test]
    fn non_darwin_has_single_metal_define() {
        let state = resolved(&[], Platform::Linux);
        let args = configure_args(Descriptor::tvm(), &state, Platform::Linux, &BTreeMap::new());
        assert_eq!(args.iter().filter(|d| d.name == "USE_METAL").count(), 1);
        assert_eq!(effective(&args)["USE_METAL"], &DefineValue::Bool(false));
    }

    #[test]
    fn build_type_is_forwarded() {
        let state = resolved(&["build_type=RelWithDebInfo"], Platform::Linux);
        let args = configure_args(Descriptor::tvm(), &state, Platform::Linux, &BTreeMap::new());
        assert!(args
            .iter()
            .any(|d| d.to_arg() == "-DCMAKE_BUILD_TYPE=RelWithDebInfo"));
    }

    #[test]
    fn translation_is_deterministic() {
        let state = resolved(&["+cuda", "+opencl", "~rpc"], Platform::Darwin);
        let mut prefixes = BTreeMap::new();
        prefixes.insert("cuda".to_owned(), PathBuf::from("/opt/cuda"));
        prefixes.insert("opencl".to_owned(), PathBuf::from("/opt/pocl"));

        let a = configure_args(Descriptor::tvm(), &state, Platform::Darwin, &prefixes);
        let b = configure_args(Descriptor::tvm(), &state, Platform::Darwin, &prefixes);
        assert_eq!(a, b);
    }

    #[test]
    fn rendering_covers_all_value_shapes() {
        assert_eq!(Define::on("X").to_arg(), "-DX=ON");
        assert_eq!(Define::flag("X", false).to_arg(), "-DX=OFF");
        assert_eq!(Define::string("X", "Debug").to_arg(), "-DX=Debug");
        assert_eq!(Define::path("X", "/opt/y").to_arg(), "-DX=/opt/y");
    }
}
