/// Launch invocation building, spawning and the server reachability probe
pub mod arguments;
pub mod classpath;
pub mod probe;
pub mod process;
pub mod types;

// Re-export commonly used types
pub use crate::game::installer::types::OsType;
pub use arguments::{get_default_jvm_args, LaunchInvocationBuilder};
pub use classpath::{build_classpath, maven_to_path};
pub use probe::probe_server;
pub use process::spawn_invocation;
pub use types::{LaunchIdentity, LaunchInvocation, LoaderKind, ServerTarget};
