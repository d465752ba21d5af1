use crate::error::{LauncherError, LauncherResult};
use crate::game::installer::types::OsType;
use crate::models::LibraryDescriptor;
use crate::utils::paths::{safe_file_name, safe_join};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Convert Maven coordinates to file path
/// Format: group:artifact:version[:classifier][@extension]
/// Example: "com.google.guava:guava:21.0" -> "com/google/guava/guava/21.0/guava-21.0.jar"
///
/// Every segment must be a plain name, so the result is always a relative
/// path that stays inside the libraries directory.
pub fn maven_to_path(coords: &str) -> LauncherResult<String> {
    let invalid = || LauncherError::InvalidPath(format!("maven coordinates '{}'", coords));
    let parts: Vec<&str> = coords.trim().split(':').collect();

    if parts.len() < 3 {
        return Err(invalid());
    }

    let group_segments = parts[0]
        .split('.')
        .map(|segment| safe_file_name(segment).map_err(|_| invalid()))
        .collect::<LauncherResult<Vec<_>>>()?;
    let group = group_segments.join("/");
    let artifact = parts[1];
    let mut version = parts[2];
    let mut classifier = None;
    let mut extension = "jar";

    if parts.len() == 3 {
        // group:artifact:version@extension
        if let Some((v, ext)) = version.split_once('@') {
            version = v;
            extension = ext;
        }
    } else {
        // group:artifact:version:classifier[@extension]
        if let Some((clf, ext)) = parts[3].split_once('@') {
            classifier = Some(clf);
            extension = ext;
        } else {
            classifier = Some(parts[3]);
        }
    }

    for segment in [artifact, version, extension]
        .into_iter()
        .chain(classifier)
    {
        if segment.is_empty() || segment.contains("..") || safe_file_name(segment).is_err() {
            return Err(invalid());
        }
    }

    let filename = if let Some(clf) = classifier {
        format!("{}-{}-{}.{}", artifact, version, clf, extension)
    } else {
        format!("{}-{}.{}", artifact, version, extension)
    };

    Ok(format!("{}/{}/{}/{}", group, artifact, version, filename))
}

/// Classpath entries for the libraries that apply to `os` and exist on disk.
///
/// Each library is looked up at its coordinate path first, then at the
/// artifact path its descriptor declares. Missing libraries are left out
/// rather than failing; the game reports what it cannot load.
pub fn build_classpath(
    libraries: &[LibraryDescriptor],
    libraries_dir: &Path,
    os: OsType,
) -> Vec<PathBuf> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut missing = 0;

    for library in libraries {
        if !library.applies_to(os.as_str()) {
            continue;
        }

        let mut candidates = Vec::with_capacity(2);
        match maven_to_path(&library.name) {
            Ok(relative) => candidates.push(relative),
            Err(e) => log::debug!("Library {} has no usable coordinates: {}", library.name, e),
        }
        if let Some(artifact) = library.artifact() {
            candidates.push(artifact.path.clone());
        }

        let found = candidates
            .iter()
            .filter_map(|relative| safe_join(libraries_dir, relative).ok())
            .find(|path| path.is_file());

        match found {
            Some(path) => {
                if seen.insert(path.clone()) {
                    entries.push(path);
                }
            }
            None => {
                log::debug!("Library not on disk, leaving off classpath: {}", library.name);
                missing += 1;
            }
        }
    }

    if missing > 0 {
        log::warn!("{} declared libraries are missing from {:?}", missing, libraries_dir);
    }
    entries
}

pub fn join_classpath(entries: &[PathBuf], os: OsType) -> String {
    entries
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(os.classpath_separator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maven_to_path_simple() {
        let path = maven_to_path("com.google.guava:guava:21.0").unwrap();
        assert_eq!(path, "com/google/guava/guava/21.0/guava-21.0.jar");
    }

    #[test]
    fn test_maven_to_path_with_classifier() {
        let path = maven_to_path("org.lwjgl:lwjgl:3.3.1:natives-windows").unwrap();
        assert_eq!(path, "org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1-natives-windows.jar");
    }

    #[test]
    fn test_maven_to_path_with_extension() {
        let path = maven_to_path("com.example:lib:1.0:sources@zip").unwrap();
        assert_eq!(path, "com/example/lib/1.0/lib-1.0-sources.zip");
    }

    #[test]
    fn rejects_traversal_and_short_coordinates() {
        assert!(maven_to_path("com.example:lib").is_err());
        assert!(maven_to_path("com..evil:lib:1.0").is_err());
        assert!(maven_to_path("com.example:lib:../../1.0").is_err());
        assert!(maven_to_path("com.example:lib:1.0@../x").is_err());
    }

    fn library(json: &str) -> LibraryDescriptor {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn classpath_keeps_only_present_libraries() {
        let tmp = tempfile::tempdir().unwrap();
        let libs = tmp.path();
        let present = libs.join("org/ow2/asm/asm/9.6/asm-9.6.jar");
        std::fs::create_dir_all(present.parent().unwrap()).unwrap();
        std::fs::write(&present, "").unwrap();

        let declared = vec![
            library(r#"{"name":"org.ow2.asm:asm:9.6"}"#),
            library(r#"{"name":"org.ow2.asm:asm:9.6"}"#),
            library(r#"{"name":"com.example:absent:1.0"}"#),
            library(
                r#"{"name":"org.lwjgl:lwjgl:3.3.1","rules":[{"action":"allow","os":{"name":"osx"}}]}"#,
            ),
        ];

        let entries = build_classpath(&declared, libs, OsType::Linux);
        assert_eq!(entries, vec![present]);
    }

    #[test]
    fn falls_back_to_declared_artifact_path() {
        let tmp = tempfile::tempdir().unwrap();
        let custom = tmp.path().join("custom/loader.jar");
        std::fs::create_dir_all(custom.parent().unwrap()).unwrap();
        std::fs::write(&custom, "").unwrap();

        let declared = vec![library(
            r#"{"name":"net.fabricmc:fabric-loader:0.15.0",
                "downloads":{"artifact":{"url":"u","path":"custom/loader.jar"}}}"#,
        )];
        assert_eq!(build_classpath(&declared, tmp.path(), OsType::Linux), vec![custom]);
    }

    #[test]
    fn join_uses_os_separator() {
        let entries = vec![PathBuf::from("a.jar"), PathBuf::from("b.jar")];
        assert_eq!(join_classpath(&entries, OsType::Windows), "a.jar;b.jar");
        assert_eq!(join_classpath(&entries, OsType::Linux), "a.jar:b.jar");
    }
}
