use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use autotranslate_cli::{
    MergeCommandOptions, TranslateCommandOptions, run_merge_command, run_translate_command,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log pipeline details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Machine-translate string tables into a new language.
    Translate {
        /// Input files or glob patterns (`**` recurses)
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Language name written into the output tag, e.g. "Français"
        #[arg(long)]
        lang: String,

        /// Target language code sent to the translation service, e.g. "fr"
        #[arg(long = "lang-code")]
        lang_code: String,

        /// Credentials file holding the translation API key
        #[arg(long, env = "AUTOTRANSLATE_CREDENTIALS")]
        account: Option<PathBuf>,

        /// Overwrite existing target files
        #[arg(long)]
        replace: bool,

        /// Refresh the original attribute of existing strings
        #[arg(long = "update-original-tag")]
        update_original: bool,

        /// Retranslate strings whose source text changed
        #[arg(long = "update-changed")]
        update_changed: bool,

        /// Output subdirectory instead of the uppercased language code
        #[arg(long = "subdir-override")]
        subdir_override: Option<String>,

        /// Source language code (default: en)
        #[arg(long = "source-lang")]
        source_lang: Option<String>,

        /// Strings per translation request (default: 10)
        #[arg(long = "chunk-size")]
        chunk_size: Option<usize>,

        /// Translation service endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// TOML file with defaults for the options above
        #[arg(long)]
        config: Option<PathBuf>,

        /// Translate and merge without writing any file
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Write a JSON summary of the run to this path
        #[arg(long = "report-json")]
        report_json: Option<PathBuf>,
    },

    /// Merge an already translated table into an existing one.
    Merge {
        /// Translated table to merge from
        #[arg(short, long)]
        source: PathBuf,

        /// Existing table to merge into
        #[arg(short, long)]
        target: PathBuf,

        /// Write the result here instead of over the target
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Language name to write into the tag
        #[arg(short, long)]
        lang: Option<String>,

        /// Take the source table as is
        #[arg(long)]
        replace: bool,

        /// Refresh the original attribute of existing strings
        #[arg(long = "update-original-tag")]
        update_original: bool,

        /// Take the source text where it differs
        #[arg(long = "update-changed")]
        update_changed: bool,

        /// Print the changes without writing
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.commands {
        Commands::Translate {
            inputs,
            lang,
            lang_code,
            account,
            replace,
            update_original,
            update_changed,
            subdir_override,
            source_lang,
            chunk_size,
            endpoint,
            config,
            dry_run,
            report_json,
        } => {
            let opts = TranslateCommandOptions {
                inputs,
                lang,
                lang_code,
                account,
                replace,
                update_original,
                update_changed,
                subdir_override,
                source_lang,
                chunk_size,
                endpoint,
                config,
                dry_run,
                report_json,
            };
            match run_translate_command(opts) {
                Ok(summary) if summary.failed > 0 => process::exit(1),
                Ok(_) => {}
                Err(e) => {
                    eprintln!("❌ {}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Merge {
            source,
            target,
            output,
            lang,
            replace,
            update_original,
            update_changed,
            dry_run,
        } => {
            let opts = MergeCommandOptions {
                source,
                target,
                output,
                lang,
                replace,
                update_original,
                update_changed,
                dry_run,
            };
            if let Err(e) = run_merge_command(opts) {
                eprintln!("❌ {}", e);
                process::exit(1);
            }
        }
    }
}
