//! Extract i18n
//!
//! Runs extraction (or pseudo-translation) over a set of files.

use anyhow::{Context, Result};
use i18n_extractor::i18n::extractor_merger::ExtractionResult;
use i18n_extractor::i18n::MissingTranslationStrategy;
use i18n_extractor::ml_parser::HtmlParser;
use i18n_extractor::{
    extract_messages, merge_translations, pseudo_translate, ErrorPolicy, ExtractorConfig,
    TranslationBundle,
};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Print every extracted message.
    #[default]
    Messages,
    /// Print each document with its messages pseudo-translated.
    Pseudo,
}

/// Options for i18n extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractI18nOptions {
    pub files: Vec<PathBuf>,
    pub config: ExtractorConfig,
    pub mode: OutputMode,
    /// Style message dumps with ANSI escapes.
    pub styled: bool,
}

/// Output for one input file.
#[derive(Debug)]
pub struct FileOutput {
    /// The file path as given.
    pub name: String,
    pub output: String,
    pub message_count: usize,
    /// Messages skipped under [`ErrorPolicy::Skip`], as display strings.
    pub diagnostics: Vec<String>,
}

/// Load an [`ExtractorConfig`] from a JSON file.
pub fn load_config(path: &Path) -> Result<ExtractorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Process every file in parallel. Results come back in input order.
pub fn extract_i18n(options: &ExtractI18nOptions) -> Result<Vec<FileOutput>> {
    options
        .files
        .par_iter()
        .map(|path| process_file(path, options))
        .collect()
}

pub fn process_file(path: &Path, options: &ExtractI18nOptions) -> Result<FileOutput> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    render_source(
        &source,
        &path.display().to_string(),
        &options.config,
        options.mode,
        options.styled,
    )
}

/// Extract from `source` and render it, unstyled, for `mode`.
pub fn process_source(
    source: &str,
    url: &str,
    config: &ExtractorConfig,
    mode: OutputMode,
) -> Result<FileOutput> {
    render_source(source, url, config, mode, false)
}

fn render_source(
    source: &str,
    url: &str,
    config: &ExtractorConfig,
    mode: OutputMode,
    styled: bool,
) -> Result<FileOutput> {
    let nodes = HtmlParser::new()
        .with_max_depth(config.max_document_depth)
        .parse_document(source, url)
        .with_context(|| format!("failed to parse {}", url))?;
    let ExtractionResult { messages, errors } = extract_messages(&nodes, config)
        .with_context(|| format!("failed to extract messages from {}", url))?;
    tracing::debug!(file = url, messages = messages.len(), "processed file");

    let output = match mode {
        OutputMode::Messages => messages
            .values()
            .map(|message| crate::printer::format_message(message, styled))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Pseudo => {
            let mut bundle = TranslationBundle::new(MissingTranslationStrategy::Warning);
            for message in messages.values() {
                bundle.add(pseudo_translate(message));
            }
            merge_translations(&nodes, &bundle, config)
                .with_context(|| format!("failed to pseudo-translate {}", url))?
        }
    };
    let diagnostics = errors
        .iter()
        .map(|err| format!("{}: {}", url, err))
        .collect();
    Ok(FileOutput {
        name: url.to_string(),
        output,
        message_count: messages.len(),
        diagnostics,
    })
}

/// Apply `--keep-going`.
pub fn with_keep_going(config: ExtractorConfig, keep_going: bool) -> ExtractorConfig {
    if keep_going {
        config.with_error_policy(ErrorPolicy::Skip)
    } else {
        config
    }
}
