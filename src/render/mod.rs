//! Plain-text report rendering for repository payloads.

use anyhow::Result;
use std::io::Write;

use crate::filter::{self, extract_range};
use crate::payload::{Repository, RepositoryPayload, Requirement, Resource, format_last_modified};

/// Display options shared by the report and single-filter modes.
pub struct RenderOptions {
    /// Apply the display simplification pass before range extraction.
    pub simplify: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { simplify: true }
    }
}

pub fn render_report(
    payload: &RepositoryPayload,
    options: &RenderOptions,
    out: &mut impl Write,
) -> Result<()> {
    if !payload.status {
        writeln!(out, "Bundle repository service not available.")?;
        writeln!(out)?;
    }

    if !payload.repositories.is_empty() {
        writeln!(out, "Repositories:")?;
        for repository in &payload.repositories {
            render_repository(repository, out)?;
        }
        writeln!(out)?;
    }

    for (index, resource) in payload.resources.iter().enumerate() {
        render_resource(index + 1, resource, options, out)?;
    }

    Ok(())
}

fn render_repository(repository: &Repository, out: &mut impl Write) -> Result<()> {
    let modified = repository
        .last_modified
        .and_then(format_last_modified)
        .unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "  {}  {}  (last modified {})",
        repository.name, repository.url, modified
    )?;
    Ok(())
}

fn render_resource(
    index: usize,
    resource: &Resource,
    options: &RenderOptions,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(
        out,
        "#{} {} ({} {})",
        index,
        resource.display_name(),
        resource.symbolic_name,
        resource.version
    )?;
    if !resource.categories.is_empty() {
        writeln!(out, "  categories: {}", resource.categories.join(", "))?;
    }
    for requirement in &resource.requirements {
        writeln!(out, "  requires {}", requirement_line(requirement, options))?;
    }
    for capability in &resource.capabilities {
        writeln!(
            out,
            "  provides {} ({} properties)",
            capability.name,
            capability.properties.len()
        )?;
    }
    Ok(())
}

/// One requirement as `name  [lower, upper)`, falling back to the raw filter
/// text when it cannot be parsed or has no range shape. Parse failures are
/// non-fatal to the report.
pub fn requirement_line(requirement: &Requirement, options: &RenderOptions) -> String {
    let suffix = if requirement.optional {
        "  (optional)"
    } else {
        ""
    };

    match filter::parse(&requirement.filter) {
        Ok(tree) => {
            let tree = if options.simplify {
                tree.simplify()
            } else {
                tree
            };
            match extract_range(&tree) {
                Some(range) => format!("{}  {}{}", range.name, range.bounds(), suffix),
                None => format!("{}{}", requirement.filter, suffix),
            }
        }
        Err(err) => {
            tracing::warn!(
                "Skipping malformed filter in requirement '{}': {}",
                requirement.name,
                err
            );
            format!("{}{}", requirement.filter, suffix)
        }
    }
}
