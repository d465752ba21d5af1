pub mod installer;
pub mod launcher;
pub mod matcher;
pub mod pipeline;

pub use pipeline::{LauncherPipeline, PackInstall, PackSelection};
