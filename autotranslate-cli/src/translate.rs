use crate::config::{Config, load_api_key};
use crate::gateway::GoogleTranslator;
use crate::path_glob::{expand_input_globs, is_generated_output};
use crate::validation::{
    validate_chunk_size, validate_language_code, validate_language_name, validate_output_path,
};
use autotranslate::{
    DEFAULT_CHUNK_SIZE, Error, FileReport, MergeOptions, Progress, TranslateOptions, Translator,
    translate_file,
};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct TranslateCommandOptions {
    pub inputs: Vec<String>,
    pub lang: String,
    pub lang_code: String,
    pub account: Option<PathBuf>,
    pub replace: bool,
    pub update_original: bool,
    pub update_changed: bool,
    pub subdir_override: Option<String>,
    pub source_lang: Option<String>,
    pub chunk_size: Option<usize>,
    pub endpoint: Option<String>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub report_json: Option<PathBuf>,
}

/// Per-run counters printed at the end and used for the exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Translated,
    Skipped,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct FileResult {
    pub source: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FileReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn run_translate_command(opts: TranslateCommandOptions) -> Result<RunSummary, String> {
    validate_language_name(&opts.lang)?;
    validate_language_code(&opts.lang_code)?;

    let config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let source_language = opts
        .source_lang
        .clone()
        .or(config.source_language)
        .unwrap_or_else(|| "en".to_string());
    validate_language_code(&source_language)?;

    let chunk_size = opts
        .chunk_size
        .or(config.chunk_size)
        .unwrap_or(DEFAULT_CHUNK_SIZE);
    validate_chunk_size(chunk_size)?;

    if let Some(report_path) = &opts.report_json {
        validate_output_path(report_path)?;
    }

    let credentials = opts.account.clone().or(config.credentials).ok_or_else(|| {
        "No credentials given; pass --account or set AUTOTRANSLATE_CREDENTIALS".to_string()
    })?;
    let api_key = load_api_key(&credentials)?;
    let translator = GoogleTranslator::new(api_key, opts.endpoint.clone().or(config.endpoint))?;

    let options = TranslateOptions::new(opts.lang.clone(), opts.lang_code.clone())
        .with_source_language(source_language)
        .with_subdir(opts.subdir_override.clone())
        .with_chunk_size(chunk_size)
        .with_merge(
            MergeOptions::new()
                .with_replace(opts.replace)
                .with_update_original(opts.update_original)
                .with_update_changed(opts.update_changed),
        )
        .with_dry_run(opts.dry_run);

    let subdir = options.subdir();
    let files: Vec<PathBuf> = expand_input_globs(&opts.inputs)?
        .into_iter()
        .filter(|path| {
            let generated = is_generated_output(path, &subdir);
            if generated {
                tracing::debug!(path = %path.display(), "skipping generated output");
            }
            !generated
        })
        .collect();
    if files.is_empty() {
        return Err("No files found matching the provided globs!".to_string());
    }

    let results = translate_files(&files, &options, &translator);
    let summary = summarize(&results);

    println!();
    println!(
        "Done: {} translated, {} skipped, {} failed",
        summary.translated, summary.skipped, summary.failed
    );
    if opts.dry_run {
        println!("Dry-run mode: no files were written");
    }

    if let Some(report_path) = &opts.report_json {
        write_report(report_path, &options, &summary, &results)?;
        println!("Report JSON written: {}", report_path.display());
    }

    Ok(summary)
}

/// Runs the pipeline over `files` in order. A failing file never stops the
/// remaining ones.
pub fn translate_files<T: Translator + ?Sized>(
    files: &[PathBuf],
    options: &TranslateOptions,
    translator: &T,
) -> Vec<FileResult> {
    files
        .iter()
        .map(|path| match translate_file(path, options, translator, render_progress) {
            Ok(report) => {
                for event in &report.merge.events {
                    println!("{}", event);
                }
                if report.written {
                    println!("✅ Wrote {}", report.target.display());
                }
                FileResult {
                    source: path.clone(),
                    status: FileStatus::Translated,
                    report: Some(report),
                    message: None,
                }
            }
            Err(e) if e.is_skip() => {
                println!("{}", skip_message(&e));
                FileResult {
                    source: path.clone(),
                    status: FileStatus::Skipped,
                    report: None,
                    message: Some(e.to_string()),
                }
            }
            Err(e) => {
                eprintln!("❌ Failed to translate {}: {}", path.display(), e);
                FileResult {
                    source: path.clone(),
                    status: FileStatus::Failed,
                    report: None,
                    message: Some(e.to_string()),
                }
            }
        })
        .collect()
}

pub fn summarize(results: &[FileResult]) -> RunSummary {
    results
        .iter()
        .fold(RunSummary::default(), |mut acc, r| {
            match r.status {
                FileStatus::Translated => acc.translated += 1,
                FileStatus::Skipped => acc.skipped += 1,
                FileStatus::Failed => acc.failed += 1,
            }
            acc
        })
}

fn skip_message(error: &Error) -> String {
    match error {
        Error::AlreadyExists(path) => {
            format!("Target file already exists, skipping {}", path.display())
        }
        Error::EmptyInput(path) => {
            format!("No translatable strings found, skipping {}", path.display())
        }
        other => other.to_string(),
    }
}

fn render_progress(event: Progress<'_>) {
    match event {
        Progress::Started {
            source,
            target,
            strings,
            language,
        } => {
            println!("Translating {} strings to {}", strings, language);
            println!("  from: {}", source.display());
            println!("  to: {}", target.display());
        }
        Progress::Chunk { done, total } if done < total => {
            print!("{}%..", done * 100 / total.max(1));
            let _ = std::io::stdout().flush();
        }
        Progress::Chunk { .. } => {}
        Progress::Finished => println!("100%"),
    }
}

fn write_report(
    path: &Path,
    options: &TranslateOptions,
    summary: &RunSummary,
    results: &[FileResult],
) -> Result<(), String> {
    let payload = json!({
        "language": options.language,
        "language_code": options.language_code,
        "source_language": options.source_language,
        "subdir": options.subdir(),
        "merge": options.merge,
        "dry_run": options.dry_run,
        "summary": {
            "translated": summary.translated,
            "skipped": summary.skipped,
            "failed": summary.failed
        },
        "files": results
    });

    let text = serde_json::to_string_pretty(&payload)
        .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
    std::fs::write(path, text)
        .map_err(|e| format!("Failed to write report JSON '{}': {}", path.display(), e))
}
