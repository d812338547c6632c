pub mod config;
pub mod error;
pub mod logging;

// Download pipeline, leaf first.
pub mod size_fmt;
pub mod url_model;
pub mod fetch_head;
pub mod resolver;
pub mod segmenter;
pub mod downloader;
pub mod storage;
pub mod sink;
pub mod scheduler;

pub use error::JobError;
pub use scheduler::{run_job, JobReport, JobRequest};
