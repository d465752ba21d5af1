use crate::error::{LauncherError, LauncherResult};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Extract a zip archive into `dest_dir`, overwriting existing files.
///
/// Entries whose names would resolve outside `dest_dir` abort the extraction
/// with `InvalidPath`. Returns the number of files written.
pub fn extract(archive_path: &Path, dest_dir: &Path) -> LauncherResult<usize> {
    log::debug!("Extracting {:?} to: {:?}", archive_path, dest_dir);

    let archive_err = |reason: String| LauncherError::Archive {
        path: archive_path.to_path_buf(),
        reason,
    };

    std::fs::create_dir_all(dest_dir).map_err(|e| LauncherError::io(dest_dir, e))?;

    let file = File::open(archive_path).map_err(|e| LauncherError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| archive_err(e.to_string()))?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| LauncherError::InvalidPath(entry.name().to_string()))?;
        let outpath = dest_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| LauncherError::io(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| LauncherError::io(&outpath, e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| LauncherError::io(&outpath, e))?;
        written += 1;

        // Set permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| LauncherError::io(&outpath, e))?;
            }
        }
    }

    log::info!("Extracted {} files from {:?}", written, archive_path);
    Ok(written)
}

/// [`extract`] on the blocking pool.
pub async fn extract_async(archive_path: PathBuf, dest_dir: PathBuf) -> LauncherResult<usize> {
    let source = archive_path.clone();
    tokio::task::spawn_blocking(move || extract(&archive_path, &dest_dir))
        .await
        .map_err(|e| LauncherError::Archive {
            path: source,
            reason: format!("extraction task failed: {}", e),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn extracts_nested_entries_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("pack.zip");
        write_zip(
            &archive,
            &[
                ("mods/", ""),
                ("mods/sodium.jar", "jar"),
                ("config/sodium.json", "{}"),
            ],
        );

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(dest.join("config")).unwrap();
        std::fs::write(dest.join("config/sodium.json"), "old").unwrap();

        let count = extract(&archive, &dest).unwrap();
        assert_eq!(count, 2);
        assert_eq!(std::fs::read(dest.join("mods/sodium.jar")).unwrap(), b"jar");
        assert_eq!(
            std::fs::read_to_string(dest.join("config/sodium.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn rejects_entries_escaping_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("evil.zip");
        write_zip(&archive, &[("../evil.txt", "x")]);

        let dest = tmp.path().join("out");
        let err = extract(&archive, &dest).unwrap_err();
        assert!(matches!(err, LauncherError::InvalidPath(_)));
        assert!(!tmp.path().join("evil.txt").exists());
    }

    #[test]
    fn garbage_is_an_archive_error() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("not.zip");
        std::fs::write(&archive, "definitely not a zip").unwrap();
        let err = extract(&archive, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, LauncherError::Archive { .. }));
    }

    #[tokio::test]
    async fn async_wrapper_extracts() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("pack.zip");
        write_zip(&archive, &[("a.txt", "a")]);
        let count = extract_async(archive, tmp.path().join("out")).await.unwrap();
        assert_eq!(count, 1);
    }
}
