pub mod deployment;
pub mod error;
pub mod storage_backend;
pub mod uploader;
