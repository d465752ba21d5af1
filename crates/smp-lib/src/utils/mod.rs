pub mod version;
pub mod paths;
