//! cdoc — generate reST or JSON documentation from kernel-doc style
//! comments in C source files.
//!
//! Two modes:
//!
//! - **stdin mode**: `cdoc < file.c` writes the rendered document to stdout.
//! - **file mode**: `cdoc -o docs src/*.c` writes one output file per input.

use anyhow::{bail, Context, Result};
use cdoc::model::Dialect;
use cdoc::{parser, render, snippet};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "cdoc",
    about = "Extract kernel-doc style documentation comments from C sources"
)]
struct Cli {
    /// Input files (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: rest (default), json
    #[arg(short = 'f', long, default_value = "rest")]
    format: String,

    /// Initial markup dialect: reST (default) or kernel-doc.
    /// In-text parse-markup directives override it per file.
    #[arg(long, default_value = "reST")]
    markup: String,

    /// Omit the mode line and src-file comment from reST output
    #[arg(long)]
    no_preamble: bool,

    /// Directory to write extracted parse-SNIP snippets into
    #[arg(long)]
    snippets: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dialect = match Dialect::from_name(&cli.markup) {
        Some(d) => d,
        None => bail!("unknown markup dialect: {}. Use reST or kernel-doc", cli.markup),
    };

    if cli.files.is_empty() {
        return stdin_mode(&cli, dialect);
    }
    file_mode(&cli, dialect)
}

/// stdin mode: parse stdin as one unit and write the result to stdout.
fn stdin_mode(cli: &Cli, dialect: Dialect) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let doc = parser::parse_unit("<stdin>", &input, dialect)?;
    report_warnings(&doc);
    let renderer = render::create_renderer(&cli.format, !cli.no_preamble)?;
    print!("{}", renderer.render(&doc));
    Ok(())
}

/// file mode: process every input file, write one output file per unit.
/// Units that fail to parse are reported and skipped; their failure is
/// reflected in the exit status.
fn file_mode(cli: &Cli, dialect: Dialect) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;
    if let Some(ref dir) = cli.snippets {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create snippet directory: {}", dir.display()))?;
    }

    let renderer = render::create_renderer(&cli.format, !cli.no_preamble)?;
    let ext = renderer.file_extension();
    let input_files = expand_globs(&cli.files)?;

    let mut failures = 0usize;
    for path in &input_files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path.to_string_lossy();

        let doc = match parser::parse_unit(&name, &content, dialect) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("error: {name}: {e}");
                failures += 1;
                continue;
            }
        };
        report_warnings(&doc);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        let out_path = output_dir.join(format!("{stem}.{ext}"));
        fs::write(&out_path, renderer.render(&doc))
            .with_context(|| format!("failed to write {}", out_path.display()))?;

        if let Some(ref dir) = cli.snippets {
            write_snippets(dir, path, &content)?;
        }
    }

    if failures > 0 {
        bail!("{failures} file(s) failed to parse");
    }
    Ok(())
}

/// Extract the snippets of one source file into the snippet directory,
/// one file per label, keeping the source file's extension.
fn write_snippets(dir: &Path, source: &Path, content: &str) -> Result<()> {
    let src_ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "txt".to_string());

    let mut iter = snippet::snippets(content);
    for snip in iter.by_ref() {
        let out_path = dir.join(format!("{}.{}", snip.label, src_ext));
        fs::write(&out_path, &snip.text)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
    }
    for warning in iter.warnings() {
        eprintln!("{}:{}: {}", source.display(), warning.line, warning);
    }
    Ok(())
}

fn report_warnings(doc: &cdoc::Document) {
    for warning in &doc.warnings {
        eprintln!("{}:{}: {}", doc.file, warning.line, warning);
    }
}

/// Expand glob patterns into a list of real file paths.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let mut matched = false;
        for entry in glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {pattern}"))?
        {
            let entry = entry?;
            if entry.is_file() {
                files.push(entry);
                matched = true;
            }
        }
        if !matched {
            bail!("no files match: {pattern}");
        }
    }
    Ok(files)
}
