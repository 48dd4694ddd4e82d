/**
 * i18n extractor CLI - xi18n
 *
 * Extract localizable messages from HTML templates
 */
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use i18n_extractor::ExtractorConfig;
use i18n_extractor_cli::extract_i18n::{
    extract_i18n, load_config, with_keep_going, ExtractI18nOptions, OutputMode,
};
use std::path::{Path, PathBuf};
use std::process;
use supports_color::Stream;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("xi18n")
        .version(i18n_extractor_cli::version())
        .about("Extract localizable messages from HTML templates")
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Template files to extract from"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON file with extractor settings"),
        )
        .arg(
            Arg::new("pseudo")
                .long("pseudo")
                .action(ArgAction::SetTrue)
                .help("Print each document with pseudo-translated messages"),
        )
        .arg(
            Arg::new("keep-going")
                .short('k')
                .long("keep-going")
                .action(ArgAction::SetTrue)
                .help("Skip messages that fail to build instead of stopping"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log debug output to stderr"),
        )
        .get_matches();

    setup_tracing(matches.get_flag("verbose"));

    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|files| files.cloned().collect())
        .unwrap_or_default();
    let mode = if matches.get_flag("pseudo") {
        OutputMode::Pseudo
    } else {
        OutputMode::Messages
    };

    if let Err(err) = run(
        files,
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
        matches.get_flag("keep-going"),
        mode,
    ) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(files: Vec<PathBuf>, config: Option<&Path>, keep_going: bool, mode: OutputMode) -> Result<()> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => ExtractorConfig::default(),
    };
    let options = ExtractI18nOptions {
        files,
        config: with_keep_going(config, keep_going),
        mode,
        styled: supports_color::on(Stream::Stdout).is_some(),
    };

    let outputs = extract_i18n(&options)?;
    let mut skipped = 0;
    for output in &outputs {
        if outputs.len() > 1 {
            println!("==> {} <==", output.name);
        }
        println!("{}", output.output);
        for diagnostic in &output.diagnostics {
            eprintln!("Warning: {}", diagnostic);
        }
        skipped += output.diagnostics.len();
    }
    tracing::info!(
        files = outputs.len(),
        messages = outputs.iter().map(|o| o.message_count).sum::<usize>(),
        skipped,
        "done"
    );
    Ok(())
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
