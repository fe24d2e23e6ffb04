use anyhow::{Context, Result, bail};
use clap::Parser;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::filter::{self, extract_range};
use crate::payload::RepositoryPayload;
use crate::render::{self, RenderOptions};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Requirement filter string to analyze
    #[arg(short, long)]
    pub filter: Option<String>,

    /// OBR repository payload (JSON) to render as a report
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Capability attribute for --filter matching, as key=value (repeatable)
    #[arg(short, long = "attr")]
    pub attrs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the display simplification pass
    #[arg(long)]
    pub no_simplify: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(cli: &Cli) -> Result<()> {
    if cli.filter.is_none() && cli.input.is_none() {
        bail!("CLI: nothing to do; pass --filter and/or --input");
    }

    let options = RenderOptions {
        simplify: !cli.no_simplify,
    };
    let mut out = open_output(cli.output.as_deref())?;

    if let Some(text) = &cli.filter {
        inspect_filter(text, &cli.attrs, &options, &mut out)?;
    }

    if let Some(path) = &cli.input {
        let payload = RepositoryPayload::load(path)?;
        let (repository_count, resource_count, requirement_count) = summarize_payload(&payload);
        tracing::info!(
            "Loaded {} repositories, {} resources, {} requirements from {:?}",
            repository_count,
            resource_count,
            requirement_count,
            path
        );
        render::render_report(&payload, &options, &mut out)?;
    }

    out.flush().context("CLI: failed to flush output")?;
    Ok(())
}

fn open_output(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    let raw: Box<dyn Write> = match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("CLI: failed to create {:?}", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    Ok(BufWriter::new(raw))
}

/// Analyze one filter string: parsed tree, simplified form, display range,
/// and the match verdict when attributes were given.
fn inspect_filter(
    text: &str,
    attr_args: &[String],
    options: &RenderOptions,
    out: &mut impl Write,
) -> Result<()> {
    let parsed = filter::parse(text)?;
    writeln!(out, "parsed:     {}", parsed)?;

    let display = if options.simplify {
        let simplified = parsed.clone().simplify();
        writeln!(out, "simplified: {}", simplified)?;
        simplified
    } else {
        parsed.clone()
    };

    match extract_range(&display) {
        Some(range) => writeln!(out, "range:      {}  {}", range.name, range.bounds())?,
        None => writeln!(out, "range:      (not a version-range filter)")?,
    }

    if !attr_args.is_empty() {
        let attrs = parse_attrs(attr_args)?;
        // Match against the tree as parsed; the simplification pass is a
        // display transform, not a semantic one.
        writeln!(out, "matches:    {}", filter::evaluate(&parsed, &attrs))?;
    }

    Ok(())
}

fn parse_attrs(args: &[String]) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("CLI: invalid --attr {:?}; expected key=value", arg))?;
        attrs.insert(key.trim().to_string(), value.to_string());
    }
    Ok(attrs)
}

pub fn summarize_payload(payload: &RepositoryPayload) -> (usize, usize, usize) {
    let requirement_count = payload
        .resources
        .iter()
        .map(|resource| resource.requirements.len())
        .sum();
    (
        payload.repositories.len(),
        payload.resources.len(),
        requirement_count,
    )
}
