use crate::BuildError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Copy the language-bindings subtree into the platform library path.
///
/// Runs after the external build/install step succeeded. Reads
/// `<source_root>/<bindings_subdir>` and mirrors it under `platlib`.
/// Returns the number of files copied. I/O failures propagate verbatim;
/// there is no retry and no partial-state cleanup.
pub fn install_bindings(
    source_root: &Path,
    bindings_subdir: &str,
    platlib: &Path,
) -> Result<usize, BuildError> {
    let bindings = source_root.join(bindings_subdir);
    if !bindings.is_dir() {
        return Err(BuildError::BindingsMissing(bindings));
    }

    fs::create_dir_all(platlib)?;
    let mut count = 0;
    copy_recursive(&bindings, platlib, &mut count)?;
    info!(
        files = count,
        dest = %platlib.display(),
        "installed language bindings"
    );
    Ok(count)
}

fn copy_recursive(src: &Path, dst: &Path, count: &mut usize) -> Result<(), BuildError> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_recursive(&src_path, &dst_path, count)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            *count += 1;
        }
    }
    Ok(())
}
