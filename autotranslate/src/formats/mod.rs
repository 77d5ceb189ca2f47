//! String table file formats for autotranslate.
//!
//! Only the flat XML string table is supported. It is re-exported here as
//! [`StringTableFormat`] for easier access.

pub mod string_table;

pub use string_table::Format as StringTableFormat;
