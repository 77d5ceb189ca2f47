//! CLI library for testing purposes

pub mod config;
pub mod gateway;
pub mod merge;
pub mod path_glob;
pub mod translate;
pub mod validation;

pub use gateway::GoogleTranslator;
pub use merge::{MergeCommandOptions, run_merge_command};
pub use translate::{RunSummary, TranslateCommandOptions, run_translate_command};
