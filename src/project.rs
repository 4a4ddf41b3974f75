//! Project name derivation from a working directory.

use std::path::Path;

/// Last path component, or its parent's when the last component is hidden
/// (e.g. `/home/user/app/.git` → `app`). The root path yields an empty name.
pub fn project_name(directory: impl AsRef<Path>) -> String {
    let directory = directory.as_ref();
    let base = component_name(directory);
    if base.starts_with('.') {
        return directory.parent().map(component_name).unwrap_or_default();
    }
    base
}

/// Project name for the process's current directory.
pub fn current_project() -> String {
    std::env::current_dir()
        .map(project_name)
        .unwrap_or_default()
}

fn component_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
