//! The per-file translation pipeline.
//!
//! read source → escape placeholders → translate in chunks → unescape →
//! merge with the existing target → write.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    error::Error,
    operations::{MergeOptions, MergeReport, reconcile_with_path},
    placeholder::{escape, unescape},
    translator::{DEFAULT_CHUNK_SIZE, Translator, translate_in_chunks},
    types::{StringRecord, StringTable},
};

/// Options for translating one or more string tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Target language display name written to the language tag.
    pub language: String,
    /// Target language code passed to the translator (e.g. `fr`).
    pub language_code: String,
    /// Source language code passed to the translator.
    pub source_language: String,
    /// Output subdirectory; defaults to the upper-cased language code.
    pub subdir: Option<String>,
    pub chunk_size: usize,
    pub merge: MergeOptions,
    /// Run everything except writing the target file.
    pub dry_run: bool,
}

impl TranslateOptions {
    pub fn new(language: impl Into<String>, language_code: impl Into<String>) -> Self {
        TranslateOptions {
            language: language.into(),
            language_code: language_code.into(),
            source_language: "en".to_string(),
            subdir: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            merge: MergeOptions::default(),
            dry_run: false,
        }
    }

    pub fn with_source_language(mut self, source_language: impl Into<String>) -> Self {
        self.source_language = source_language.into();
        self
    }

    pub fn with_subdir(mut self, subdir: Option<String>) -> Self {
        self.subdir = subdir;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_merge(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The effective output subdirectory token.
    pub fn subdir(&self) -> String {
        match self.subdir.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => self.language_code.to_uppercase(),
        }
    }

    /// Rejects options that cannot produce a usable target file.
    pub fn validate(&self) -> Result<(), Error> {
        if self.language.trim().is_empty() {
            return Err(Error::Config("target language name is empty".to_string()));
        }
        if self.language_code.trim().is_empty() {
            return Err(Error::Config("target language code is empty".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1".to_string()));
        }
        if self.subdir().contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "output subdirectory '{}' must be a single path component",
                self.subdir()
            )));
        }
        Ok(())
    }
}

/// Pipeline progress, reported through the callback of [`translate_file`].
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started {
        source: &'a Path,
        target: &'a Path,
        strings: usize,
        language: &'a str,
    },
    Chunk {
        done: usize,
        total: usize,
    },
    Finished,
}

/// Result of one successfully processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Number of strings sent to translation.
    pub translated: usize,
    pub merge: MergeReport,
    pub written: bool,
}

/// Output path for `source`: `dir/base.ext` becomes `dir/SUB/base-SUB.ext`.
pub fn target_path_for(source: &Path, subdir: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match source.extension() {
        Some(ext) => format!("{}-{}.{}", stem, subdir, ext.to_string_lossy()),
        None => format!("{}-{}", stem, subdir),
    };
    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(subdir)
        .join(file_name)
}

/// Machine-translates the translatable records of `table`.
///
/// The result holds one record per source record, in source order.
/// Translatable records get the translated `text`, `original` set to the
/// source text and the source's extra attributes. Blank records are never
/// sent to the translator and are carried over unchanged. Its language tag
/// is `options.language`; the root element is carried over from `table`.
pub fn translate_table<T, F>(
    table: &StringTable,
    translator: &T,
    options: &TranslateOptions,
    mut on_chunk: F,
) -> Result<StringTable, Error>
where
    T: Translator + ?Sized,
    F: FnMut(usize, usize),
{
    let records = table.filter_translatable();
    let (escaped, sets): (Vec<String>, Vec<_>) =
        records.iter().map(|r| escape(&r.text)).unzip();

    let translations = translate_in_chunks(
        translator,
        &escaped,
        &options.source_language,
        &options.language_code,
        options.chunk_size,
        &mut on_chunk,
    )?;

    let mut translated = StringTable {
        metadata: table.metadata.clone(),
        records: Vec::with_capacity(table.records.len()),
    };
    translated.set_language(options.language.clone());

    let mut results = sets.iter().zip(&translations);
    for record in &table.records {
        if !record.is_translatable() {
            translated.records.push(record.clone());
            continue;
        }
        let Some((set, text)) = results.next() else {
            break;
        };
        translated.records.push(StringRecord {
            id: record.id.clone(),
            text: unescape(text, set),
            original: Some(record.text.clone()),
            extra: record.extra.clone(),
        });
    }
    Ok(translated)
}

/// Runs the whole pipeline for one source file.
///
/// Fails with [`Error::AlreadyExists`] before any translation when the target
/// exists and no merge flag allows touching it, and with
/// [`Error::EmptyInput`] when there is nothing to translate. On any error
/// the target file is left untouched.
pub fn translate_file<T, F>(
    source_path: &Path,
    options: &TranslateOptions,
    translator: &T,
    mut progress: F,
) -> Result<FileReport, Error>
where
    T: Translator + ?Sized,
    F: FnMut(Progress<'_>),
{
    options.validate()?;
    let source = StringTable::read_from(source_path)?;
    let target_path = target_path_for(source_path, &options.subdir());
    tracing::debug!(
        source = %source_path.display(),
        target = %target_path.display(),
        "resolved target path"
    );

    if !options.merge.allows_existing_target() && target_path.exists() {
        return Err(Error::AlreadyExists(target_path));
    }

    let strings = source.filter_translatable().len();
    if strings == 0 {
        return Err(Error::EmptyInput(source_path.to_path_buf()));
    }

    progress(Progress::Started {
        source: source_path,
        target: &target_path,
        strings,
        language: &options.language,
    });

    let translated = translate_table(&source, translator, options, |done, total| {
        progress(Progress::Chunk { done, total })
    })?;
    progress(Progress::Finished);

    let (table, merge) = reconcile_with_path(&translated, &target_path, &options.merge)?;
    if !options.dry_run {
        table.write_to(&target_path)?;
    }

    Ok(FileReport {
        source: source_path.to_path_buf(),
        target: target_path,
        translated: strings,
        merge,
        written: !options.dry_run,
    })
}
