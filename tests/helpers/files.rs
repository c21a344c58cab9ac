use std::path::{Path, PathBuf};

/// Write a credential set the way `ticket-report configure` would, returning its directory.
pub fn write_credentials(
    config_root: &Path,
    tracker: &str,
    name: &str,
    base_url: &str,
    email: &str,
    token: &str,
) -> PathBuf {
    let dir = config_root.join(tracker).join(format!("config{name}"));
    std::fs::create_dir_all(&dir).expect("create_dir_all call failed");
    std::fs::write(dir.join("base-url.txt"), base_url).expect("write base url");
    std::fs::write(dir.join("email-address.txt"), email).expect("write email");
    std::fs::write(dir.join("api-token.txt"), token).expect("write token");
    dir
}

/// The only file in `dir`.
pub fn single_file(dir: &Path) -> PathBuf {
    let mut files: Vec<PathBuf> = dir
        .read_dir()
        .expect("read_dir call failed")
        .map(|entry| entry.expect("DirEntry").path())
        .collect();
    assert_eq!(files.len(), 1, "expected exactly one file in {}", dir.display());
    files.remove(0)
}
