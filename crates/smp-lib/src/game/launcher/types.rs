use crate::config::{SERVER_HOST, SERVER_PORT};
use crate::game::matcher::LoaderAliasTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime flavour the pack targets. Decides the entry point when the
/// installed descriptor does not name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Vanilla,
    Fabric,
    Quilt,
    Forge,
    NeoForge,
}

impl LoaderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderKind::Vanilla => "vanilla",
            LoaderKind::Fabric => "fabric",
            LoaderKind::Quilt => "quilt",
            LoaderKind::Forge => "forge",
            LoaderKind::NeoForge => "neoforge",
        }
    }

    pub fn default_main_class(&self) -> &'static str {
        match self {
            LoaderKind::Vanilla => "net.minecraft.client.main.Main",
            LoaderKind::Fabric => "net.fabricmc.loader.impl.launch.knot.KnotClient",
            LoaderKind::Quilt => "org.quiltmc.loader.impl.launch.knot.KnotClient",
            LoaderKind::Forge | LoaderKind::NeoForge => {
                "cpw.mods.bootstraplauncher.BootstrapLauncher"
            }
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoaderKind {
    type Err = String;

    /// Accepts canonical names and every alias of the default loader table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let aliases = LoaderAliasTable::default();
        let normalized = s.trim().to_lowercase();
        let canonical = aliases
            .canonical(&normalized)
            .map(str::to_string)
            .unwrap_or(normalized);
        match canonical.as_str() {
            "vanilla" | "minecraft" | "none" => Ok(LoaderKind::Vanilla),
            "fabric" => Ok(LoaderKind::Fabric),
            "quilt" => Ok(LoaderKind::Quilt),
            "forge" => Ok(LoaderKind::Forge),
            "neoforge" => Ok(LoaderKind::NeoForge),
            _ => Err(format!("unknown loader '{}'", s)),
        }
    }
}

/// Everything an external spawner needs to start the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl LaunchInvocation {
    /// Shell-like rendering for logs and `--dry-run`. Not meant to be re-parsed.
    pub fn display_command(&self) -> String {
        let mut out = quote(&self.program.to_string_lossy());
        for arg in &self.args {
            out.push(' ');
            out.push_str(&quote(arg));
        }
        out
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

pub const OFFLINE_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// Identity placeholders passed to the game. No authentication happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchIdentity {
    pub username: String,
    pub uuid: String,
    pub access_token: String,
    pub user_type: String,
}

impl Default for LaunchIdentity {
    fn default() -> Self {
        Self {
            username: "Player".to_string(),
            uuid: OFFLINE_UUID.to_string(),
            access_token: "0".to_string(),
            user_type: "legacy".to_string(),
        }
    }
}

/// Server the game should connect to on start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerTarget {
    pub host: String,
    pub port: u16,
}

impl ServerTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ServerTarget {
    fn default() -> Self {
        Self::new(SERVER_HOST, SERVER_PORT)
    }
}

impl fmt::Display for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_kind_accepts_aliases() {
        assert_eq!("fabric-loader".parse::<LoaderKind>().unwrap(), LoaderKind::Fabric);
        assert_eq!(" NeoForged ".parse::<LoaderKind>().unwrap(), LoaderKind::NeoForge);
        assert_eq!("vanilla".parse::<LoaderKind>().unwrap(), LoaderKind::Vanilla);
        assert!("liteloader".parse::<LoaderKind>().is_err());
    }

    #[test]
    fn display_quotes_whitespace() {
        let invocation = LaunchInvocation {
            program: PathBuf::from("/opt/java/bin/java"),
            args: vec!["-cp".into(), "/My Games/a.jar".into()],
            working_dir: PathBuf::from("/tmp"),
        };
        assert_eq!(
            invocation.display_command(),
            "/opt/java/bin/java -cp \"/My Games/a.jar\""
        );
    }

    #[test]
    fn default_server_target() {
        assert_eq!(ServerTarget::default().to_string(), "supersmp.fun:25565");
    }
}
