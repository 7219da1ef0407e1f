//! `adx lint <dir>`: run one full lint pass over a template directory and
//! print the diagnostics.

use crate::OutputFormat;
use adx_json::LineIndex;
use adx_linter::{LintConfig, Linter};
use adx_project::{CollectingSink, Coordinator, LocalDocuments, LocalFileSystem};
use adx_template::{Diagnostic, FileId, Severity, MANIFEST_FILE_NAME};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(dir: &Path, format: OutputFormat, config: Option<&Path>) -> Result<i32> {
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    if !manifest_path.is_file() {
        bail!("{} does not contain a {MANIFEST_FILE_NAME}", dir.display());
    }

    let lint_config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading lint config {}", path.display()))?;
            serde_json::from_str::<LintConfig>(&text)
                .with_context(|| format!("parsing lint config {}", path.display()))?
        }
        None => LintConfig::default(),
    };

    let sink = Arc::new(CollectingSink::default());
    let coordinator = Coordinator::new(
        LocalDocuments::default(),
        LocalFileSystem,
        Arc::clone(&sink),
        Linter::new(lint_config),
    )
    .with_debounce(Duration::ZERO);

    coordinator
        .on_document_opened(FileId::new(manifest_path.to_string_lossy()))
        .await;

    let mut results: Vec<(FileId, Vec<Diagnostic>)> = sink.all().into_iter().collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut errors = 0usize;
    let mut warnings = 0usize;
    for (_, diagnostics) in &results {
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                _ => {}
            }
        }
    }

    match format {
        OutputFormat::Human => print_human(&results, errors, warnings),
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(i32::from(errors > 0))
}

fn print_human(results: &[(FileId, Vec<Diagnostic>)], errors: usize, warnings: usize) {
    for (file, diagnostics) in results {
        if diagnostics.is_empty() {
            continue;
        }
        let index = std::fs::read_to_string(file.as_str())
            .ok()
            .map(|text| LineIndex::new(&text));
        println!("{}", file.as_str().bold());
        for diagnostic in diagnostics {
            let position = index.as_ref().map_or((0, 0), |index| {
                let position = index.position(diagnostic.range.start);
                (position.line + 1, position.character + 1)
            });
            let severity = match diagnostic.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
                Severity::Information => "info".blue().bold(),
                Severity::Hint => "hint".normal(),
            };
            println!(
                "  {}:{} {} {} {}",
                position.0,
                position.1,
                severity,
                diagnostic.code.dimmed(),
                diagnostic.message
            );
        }
        println!();
    }

    if errors == 0 && warnings == 0 {
        println!("{}", "✓ No issues found".green());
    } else {
        println!(
            "{errors} error{}, {warnings} warning{}",
            if errors == 1 { "" } else { "s" },
            if warnings == 1 { "" } else { "s" },
        );
    }
}

fn print_json(results: &[(FileId, Vec<Diagnostic>)]) -> Result<()> {
    let value: serde_json::Map<String, serde_json::Value> = results
        .iter()
        .map(|(file, diagnostics)| {
            Ok((
                file.as_str().to_string(),
                serde_json::to_value(diagnostics)?,
            ))
        })
        .collect::<Result<_, serde_json::Error>>()?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
