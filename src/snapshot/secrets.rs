use std::path::Path;

const SECRET_NAME_FRAGMENTS: [&str; 3] = ["id_rsa", ".pem", ".key"];

/// Whether `path` names a file that should never be pasted into a snapshot.
///
/// Only the file name is inspected; the file itself is not touched.
pub fn is_secret_like(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|name| name.to_string_lossy()) else {
        return false;
    };
    if name.ends_with(".env") {
        return true;
    }
    SECRET_NAME_FRAGMENTS
        .iter()
        .any(|fragment| name.contains(fragment))
}
