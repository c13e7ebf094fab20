pub mod audio;
pub mod config;
pub mod conversation;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod text;
pub mod transcript;

pub use config::PrepareConfig;
pub use error::{FisherPrepError, Result};
pub use pipeline::{prepare_corpus, print_summary, PrepareMode, PrepareSummary};
