pub mod batch;
pub mod downloader;
