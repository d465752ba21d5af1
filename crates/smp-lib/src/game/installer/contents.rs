use crate::error::{LauncherError, LauncherResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Folders of an extracted content pack that belong in the game directory.
pub const PACK_FOLDERS: [&str; 5] = ["mods", "config", "coremods", "shaderpacks", "resourcepacks"];

/// Copy the pack's content folders into `game_dir`, overwriting existing files.
///
/// Folders are looked up at the pack root and under `overrides/`; when both
/// exist the override copy wins. Returns the number of files copied.
pub fn copy_pack_contents(pack_dir: &Path, game_dir: &Path) -> LauncherResult<usize> {
    let roots = [pack_dir.to_path_buf(), pack_dir.join("overrides")];
    let mut copied = 0;

    for folder in PACK_FOLDERS {
        for root in &roots {
            let src_dir = root.join(folder);
            if !src_dir.is_dir() {
                continue;
            }
            let count = copy_tree(&src_dir, &game_dir.join(folder))?;
            log::info!("Copied {} files from {:?}", count, src_dir);
            copied += count;
        }
    }

    if copied == 0 {
        log::warn!("No pack content folders found in {:?}", pack_dir);
    }
    Ok(copied)
}

/// [`copy_pack_contents`] on the blocking pool.
pub async fn install_pack_contents(pack_dir: PathBuf, game_dir: PathBuf) -> LauncherResult<usize> {
    let source = pack_dir.clone();
    tokio::task::spawn_blocking(move || copy_pack_contents(&pack_dir, &game_dir))
        .await
        .map_err(|e| LauncherError::Io {
            path: source,
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?
}

fn copy_tree(src_dir: &Path, dest_dir: &Path) -> LauncherResult<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src_dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src_dir).to_path_buf();
            LauncherError::Io {
                path,
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk loop")),
            }
        })?;
        let path = entry.path();
        let relative = path
            .strip_prefix(src_dir)
            .map_err(|_| LauncherError::InvalidPath(path.display().to_string()))?;
        let target = dest_dir.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| LauncherError::io(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
            }
            std::fs::copy(path, &target).map_err(|e| LauncherError::io(&target, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn copies_known_folders_only() {
        let tmp = tempfile::tempdir().unwrap();
        let pack = tmp.path().join("pack");
        touch(&pack.join("mods/a.jar"), "a");
        touch(&pack.join("config/deep/b.toml"), "b");
        touch(&pack.join("shaderpacks/c.zip"), "c");
        touch(&pack.join("README.md"), "ignored");
        touch(&pack.join("saves/world/level.dat"), "ignored");

        let game = tmp.path().join("game");
        let copied = copy_pack_contents(&pack, &game).unwrap();

        assert_eq!(copied, 3);
        assert!(game.join("mods/a.jar").exists());
        assert!(game.join("config/deep/b.toml").exists());
        assert!(game.join("shaderpacks/c.zip").exists());
        assert!(!game.join("README.md").exists());
        assert!(!game.join("saves").exists());
    }

    #[test]
    fn overrides_folder_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let pack = tmp.path().join("pack");
        touch(&pack.join("config/x.cfg"), "root");
        touch(&pack.join("overrides/config/x.cfg"), "override");

        let game = tmp.path().join("game");
        touch(&game.join("config/x.cfg"), "stale");
        copy_pack_contents(&pack, &game).unwrap();

        assert_eq!(
            std::fs::read_to_string(game.join("config/x.cfg")).unwrap(),
            "override"
        );
    }

    #[tokio::test]
    async fn empty_pack_copies_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let copied = install_pack_contents(tmp.path().to_path_buf(), tmp.path().join("game"))
            .await
            .unwrap();
        assert_eq!(copied, 0);
    }
}
