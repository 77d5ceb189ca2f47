use crate::validation::{validate_file_path, validate_language_name, validate_output_path};
use autotranslate::{
    MergeOptions, MergeOutcome, StringTable, merge_into_path, reconcile_with_path,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct MergeCommandOptions {
    pub source: PathBuf,
    pub target: PathBuf,
    pub output: Option<PathBuf>,
    pub lang: Option<String>,
    pub replace: bool,
    pub update_original: bool,
    pub update_changed: bool,
    pub dry_run: bool,
}

/// Run the merge command: reconcile an already translated table into an
/// existing one, without touching the network.
pub fn run_merge_command(opts: MergeCommandOptions) -> Result<(), String> {
    validate_file_path(&opts.source)?;
    if let Some(output) = &opts.output {
        validate_output_path(output)?;
    }
    if let Some(lang) = &opts.lang {
        validate_language_name(lang)?;
    }

    let mut source = StringTable::read_from(&opts.source)
        .map_err(|e| format!("Failed to read source '{}': {}", opts.source.display(), e))?;
    if let Some(lang) = &opts.lang {
        source.set_language(lang.clone());
    }

    let merge_options = MergeOptions::new()
        .with_replace(opts.replace)
        .with_update_original(opts.update_original)
        .with_update_changed(opts.update_changed);

    let merge_error =
        |e: autotranslate::Error| format!("Failed to merge into '{}': {}", opts.target.display(), e);

    // Writing over the target in place is the common case.
    let (report, written) = match (&opts.output, opts.dry_run) {
        (None, false) => {
            let report =
                merge_into_path(&source, &opts.target, &merge_options).map_err(merge_error)?;
            (report, Some(opts.target.clone()))
        }
        (output, dry_run) => {
            let (merged, report) =
                reconcile_with_path(&source, &opts.target, &merge_options).map_err(merge_error)?;
            let written = match output {
                Some(out) if !dry_run => {
                    merged
                        .write_to(out)
                        .map_err(|e| format!("Error writing output: {}", e))?;
                    Some(out.clone())
                }
                _ => None,
            };
            (report, written)
        }
    };

    for event in &report.events {
        println!("{}", event);
    }
    println!("Outcome: {}", report.outcome);
    if report.outcome == MergeOutcome::Merged {
        println!(
            "Added: {}, updated: {}, unchanged: {}",
            report.added(),
            report.updated(),
            report.unchanged
        );
    }

    match written {
        Some(out) => println!("✅ Merged table written to {}", out.display()),
        None => println!("Dry-run mode: no files were written"),
    }
    Ok(())
}
