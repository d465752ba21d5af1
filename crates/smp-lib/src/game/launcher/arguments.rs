use crate::error::{LauncherError, LauncherResult};
use crate::game::installer::types::{DataLayout, OsType};
use crate::game::launcher::classpath::{build_classpath, join_classpath};
use crate::game::launcher::types::{LaunchIdentity, LaunchInvocation, LoaderKind, ServerTarget};
use crate::models::VersionDescriptor;
use crate::utils::paths::safe_file_name;
use std::path::{Path, PathBuf};

pub const LAUNCHER_BRAND: &str = "SuperSMPLauncher";

/// Get default JVM arguments
pub fn get_default_jvm_args() -> Vec<String> {
    vec![
        "-Xmx4G".to_string(),
        "-Xms2G".to_string(),
        "-XX:+UseG1GC".to_string(),
    ]
}

/// Turns an installed version into a [`LaunchInvocation`].
///
/// Reads the persisted version descriptor and checks which libraries exist;
/// never writes anything and never starts a process.
#[derive(Debug, Clone)]
pub struct LaunchInvocationBuilder {
    runtime_path: PathBuf,
    jvm_args: Vec<String>,
    identity: LaunchIdentity,
    server: Option<ServerTarget>,
    os: OsType,
}

impl LaunchInvocationBuilder {
    pub fn new(runtime_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime_path: runtime_path.into(),
            jvm_args: get_default_jvm_args(),
            identity: LaunchIdentity::default(),
            server: Some(ServerTarget::default()),
            os: OsType::current(),
        }
    }

    /// Replace the default memory and GC flags.
    pub fn with_jvm_args(mut self, jvm_args: Vec<String>) -> Self {
        self.jvm_args = jvm_args;
        self
    }

    pub fn with_identity(mut self, identity: LaunchIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// `None` drops the auto-connect hint.
    pub fn with_server(mut self, server: Option<ServerTarget>) -> Self {
        self.server = server;
        self
    }

    pub fn with_os(mut self, os: OsType) -> Self {
        self.os = os;
        self
    }

    pub fn build(
        &self,
        installed_version_id: &str,
        data_dir: &Path,
        game_dir: &Path,
        loader: LoaderKind,
    ) -> LauncherResult<LaunchInvocation> {
        let version_id = safe_file_name(installed_version_id)?;
        let layout = DataLayout::new(data_dir);
        let descriptor = load_descriptor(&layout, version_id)?;

        let mut classpath = build_classpath(&descriptor.libraries, &layout.libraries_dir(), self.os);
        let binary = layout.binary_path(version_id);
        if !binary.is_file() {
            log::warn!("Primary binary missing for {}: {:?}", version_id, binary);
        }
        classpath.retain(|entry| entry != &binary);
        classpath.push(binary);

        let main_class = descriptor
            .main_class
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| loader.default_main_class());
        let asset_index = descriptor.asset_index_id().unwrap_or(version_id);

        let mut args = self.jvm_args.clone();
        args.push(format!(
            "-Djava.library.path={}",
            layout.natives_dir(version_id).to_string_lossy()
        ));
        args.push(format!("-Dminecraft.launcher.brand={}", LAUNCHER_BRAND));
        args.push(format!(
            "-Dminecraft.launcher.version={}",
            env!("CARGO_PKG_VERSION")
        ));
        args.push("-cp".to_string());
        args.push(join_classpath(&classpath, self.os));
        args.push(main_class.to_string());

        let game_args = [
            ("--username", self.identity.username.clone()),
            ("--version", version_id.to_string()),
            ("--gameDir", game_dir.to_string_lossy().to_string()),
            ("--assetsDir", layout.assets_dir().to_string_lossy().to_string()),
            ("--assetIndex", asset_index.to_string()),
            ("--uuid", self.identity.uuid.clone()),
            ("--accessToken", self.identity.access_token.clone()),
            ("--userType", self.identity.user_type.clone()),
        ];
        for (flag, value) in game_args {
            args.push(flag.to_string());
            args.push(value);
        }

        if let Some(server) = &self.server {
            args.push("--server".to_string());
            args.push(server.host.clone());
            args.push("--port".to_string());
            args.push(server.port.to_string());
        }

        log::debug!(
            "Built launch invocation for {} ({} loader, main class {}, {} classpath entries)",
            version_id,
            loader,
            main_class,
            classpath.len()
        );

        Ok(LaunchInvocation {
            program: self.runtime_path.clone(),
            args,
            working_dir: game_dir.to_path_buf(),
        })
    }
}

fn load_descriptor(layout: &DataLayout, version_id: &str) -> LauncherResult<VersionDescriptor> {
    let path = layout.descriptor_path(version_id);
    let bytes = std::fs::read(&path).map_err(|e| LauncherError::io(&path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| LauncherError::CatalogFormat {
        url: path.to_string_lossy().to_string(),
        source,
    })
}
