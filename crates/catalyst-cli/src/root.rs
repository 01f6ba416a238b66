use catalyst_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the directory commands start from.
///
/// Priority:
/// 1. `--root` flag / `CATALYST_ROOT` env var (passed in as `explicit`)
/// 2. The current directory
pub fn resolve_start(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Find the project directory of an already set-up checkout.
///
/// Walks upward from `start` looking for `.project/`, then for `.git`,
/// and falls back to `start`.
pub fn find_project_dir(start: &Path) -> PathBuf {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(paths::PROJECT_DIR).is_dir() {
            return dir;
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    paths::find_checkout_root(start).unwrap_or_else(|| start.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_start(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_project_dir_from_subdir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".project")).unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();
        assert_eq!(find_project_dir(&subdir), dir.path());
    }

    #[test]
    fn falls_back_to_git_then_start() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(repo.join(".git")).unwrap();
        std::fs::create_dir_all(repo.join("src")).unwrap();
        assert_eq!(find_project_dir(&repo.join("src")), repo);

        let loose = dir.path().join("loose");
        std::fs::create_dir_all(&loose).unwrap();
        assert_eq!(find_project_dir(&loose), loose);
    }
}
