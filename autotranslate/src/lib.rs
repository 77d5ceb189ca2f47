#![forbid(unsafe_code)]
//! Batch machine translation for game string tables.
//!
//! Reads flat XML string tables, protects `{PLACEHOLDER}` tokens, sends the
//! text through a caller-supplied [`Translator`] and merges the result into
//! an existing translated table without clobbering manual edits.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use autotranslate::{Error, MergeOptions, TranslateOptions, translate_file};
//! use std::path::Path;
//!
//! // Any closure with this shape is a translator.
//! let translator = |texts: &[String], _from: &str, _to: &str| -> Result<Vec<String>, Error> {
//!     Ok(texts.to_vec())
//! };
//!
//! let options = TranslateOptions::new("Français", "fr")
//!     .with_merge(MergeOptions::new().with_update_original(true));
//! let report = translate_file(Path::new("std_strings.xml"), &options, &translator, |_| {})?;
//! for event in &report.merge.events {
//!     println!("{}", event);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//!
//! - Order-preserving reader/writer for the `base/tags/strings` table format
//! - Placeholder escaping that survives translation services
//! - ID-keyed merge that keeps translator edits unless told otherwise
//! - Network-free core; the translation service is injected

pub mod error;
pub mod formats;
pub mod operations;
pub mod pipeline;
pub mod placeholder;
pub mod traits;
pub mod translator;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    formats::StringTableFormat,
    operations::{
        MergeEvent, MergeOptions, MergeOutcome, MergeReport, merge_into_path, merge_tables,
        reconcile_with_path,
    },
    pipeline::{FileReport, Progress, TranslateOptions, target_path_for, translate_file, translate_table},
    placeholder::{PlaceholderSet, escape, unescape},
    translator::{DEFAULT_CHUNK_SIZE, Translator, translate_in_chunks},
    types::{Metadata, StringRecord, StringTable},
};
