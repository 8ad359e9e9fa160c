//! Report formatting for the console and exported files.

use anyhow::Result;
use fsd_lint_core::{Report, Violation};
use std::fmt::{self, Write};

use crate::OutputFormat;

/// Violations listed per kind in text output.
const TEXT_LIMIT: usize = 10;

/// Violations listed per layer pair in Markdown output.
const MARKDOWN_GROUP_LIMIT: usize = 20;

/// Layer pairs listed in the summary.
const SUMMARY_TOP_PAIRS: usize = 5;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report)?),
        OutputFormat::Compact => print!("{}", render_compact(report)?),
        OutputFormat::Json => println!("{}", report.to_json_pretty()?),
        OutputFormat::Markdown => print!("{}", render_markdown(report)?),
    }
    Ok(())
}

fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write(&mut out)?;
    Ok(out)
}

/// Human-readable report: structure, then the first few violations of each kind.
pub fn render_text(report: &Report) -> Result<String, fmt::Error> {
    render(|out| {
        writeln!(out, "=== FSD Architecture Check Report ===")?;
        writeln!(out)?;

        writeln!(out, "Project structure:")?;
        let structure = report.structure();
        for (layer, slices) in structure.layers.iter() {
            if structure.is_present(layer) {
                writeln!(out, "  {layer} ({} slices)", slices.len())?;
            } else {
                writeln!(out, "  {layer} (missing)")?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Import violations:")?;
        let imports = report.import_violations();
        if imports.is_empty() {
            writeln!(out, "  No import violations found")?;
        } else {
            writeln!(out, "  Found {} violation(s):", imports.len())?;
            for (i, v) in imports.iter().take(TEXT_LIMIT).enumerate() {
                writeln!(out, "  {}. {}", i + 1, v.file.display())?;
                writeln!(out, "     imports: {}", v.import)?;
                writeln!(out, "     error: {}", v.message)?;
            }
            if imports.len() > TEXT_LIMIT {
                writeln!(out, "     ... and {} more violations", imports.len() - TEXT_LIMIT)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Directory structure issues:")?;
        let dirs = report.directory_violations();
        if dirs.is_empty() {
            writeln!(out, "  No directory structure issues found")?;
        } else {
            writeln!(out, "  Found {} issue(s):", dirs.len())?;
            for (i, v) in dirs.iter().take(TEXT_LIMIT).enumerate() {
                writeln!(out, "  {}. {}", i + 1, v.file.display())?;
                writeln!(out, "     error: {}", v.message)?;
            }
            if dirs.len() > TEXT_LIMIT {
                writeln!(out, "     ... and {} more issues", dirs.len() - TEXT_LIMIT)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "=== End of Report ===")
    })
}

/// One line per violation, imports first.
pub fn render_compact(report: &Report) -> Result<String, fmt::Error> {
    render(|out| {
        for violation in report.violations() {
            match &violation {
                Violation::Import(v) => {
                    writeln!(out, "{}: {} [{}]", v.file.display(), v.message, v.import)?;
                }
                Violation::Directory(_) => {
                    writeln!(
                        out,
                        "{}: {}",
                        violation.file().display(),
                        violation.message()
                    )?;
                }
            }
        }
        Ok(())
    })
}

/// Full Markdown document for sharing a report.
pub fn render_markdown(report: &Report) -> Result<String, fmt::Error> {
    render(|out| {
        let structure = report.structure();

        writeln!(out, "# FSD Architecture Check Report")?;
        writeln!(out)?;
        writeln!(out, "## Project Structure")?;
        writeln!(out)?;
        writeln!(out, "| Layer | Status | Slices |")?;
        writeln!(out, "|-------|--------|--------|")?;
        for (layer, slices) in structure.layers.iter() {
            if structure.is_present(layer) {
                writeln!(out, "| `{layer}` | Present | {} |", slices.len())?;
            } else {
                writeln!(out, "| `{layer}` | Missing | - |")?;
            }
        }
        writeln!(out)?;

        writeln!(out, "### Layer Contents")?;
        writeln!(out)?;
        for (layer, slices) in structure.layers.iter() {
            if !structure.is_present(layer) {
                continue;
            }
            writeln!(
                out,
                "<details>\n<summary><b>{layer}</b> ({} slices)</summary>\n",
                slices.len()
            )?;
            if slices.is_empty() {
                writeln!(out, "*No slices found in this layer*")?;
            } else {
                let mut sorted: Vec<&String> = slices.iter().collect();
                sorted.sort();
                writeln!(out, "```")?;
                for name in sorted {
                    writeln!(out, "└── {name}")?;
                }
                writeln!(out, "```")?;
            }
            writeln!(out, "</details>")?;
            writeln!(out)?;
        }

        writeln!(out, "## Dependency Rules")?;
        writeln!(out)?;
        writeln!(out, "| Layer | Can Import From |")?;
        writeln!(out, "|-------|----------------|")?;
        for (layer, allowed) in report.allowed_access().iter() {
            let allowed = if allowed.is_empty() {
                "*none*".to_owned()
            } else {
                allowed
                    .iter()
                    .map(|l| format!("`{l}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            writeln!(out, "| `{layer}` | {allowed} |")?;
        }
        writeln!(out)?;

        write_markdown_imports(out, report)?;
        write_markdown_directories(out, report)?;

        let total = report.total_violations();
        if total == 0 {
            writeln!(out, "## Conclusion")?;
            writeln!(out)?;
            writeln!(out, "The project follows the layer dependency rules.")?;
        } else {
            writeln!(out, "## Conclusion")?;
            writeln!(out)?;
            writeln!(out, "Found **{total}** issues that need to be addressed.")?;
            writeln!(out)?;
            writeln!(out, "### Recommendations")?;
            writeln!(out)?;
            let mut step = 1;
            if report.import_total() > 0 {
                writeln!(
                    out,
                    "{step}. **Fix import violations** - keep imports within the allowed layers"
                )?;
                step += 1;
            }
            if report.directory_total() > 0 {
                writeln!(
                    out,
                    "{step}. **Fix directory structure** - move root-level files into slices"
                )?;
            }
        }
        Ok(())
    })
}

fn write_markdown_imports(out: &mut String, report: &Report) -> fmt::Result {
    writeln!(out, "## Import Violations")?;
    writeln!(out)?;

    let violations = report.import_violations();
    if violations.is_empty() {
        writeln!(out, "**No import violations found**")?;
        return writeln!(out);
    }

    writeln!(out, "**Found {} violations**", violations.len())?;
    writeln!(out)?;

    let pairs = report.layer_pairs();
    writeln!(out, "### Violation Summary")?;
    writeln!(out)?;
    writeln!(out, "| From Layer | To Layer | Count |")?;
    writeln!(out, "|------------|----------|-------|")?;
    for ((from, to), count) in &pairs {
        writeln!(out, "| `{from}` | `{to}` | {count} |")?;
    }
    writeln!(out)?;

    writeln!(out, "### Detailed Violations")?;
    writeln!(out)?;
    for ((from, to), count) in &pairs {
        writeln!(
            out,
            "<details>\n<summary><b>{from} → {to}</b> ({count} violations)</summary>\n"
        )?;
        let group = violations
            .iter()
            .filter(|v| &v.from_layer == from && &v.to_layer == to);
        for (i, v) in group.take(MARKDOWN_GROUP_LIMIT).enumerate() {
            writeln!(out, "**{}.** `{}`", i + 1, v.file.display())?;
            writeln!(out, "   - Imports: `{}`", v.import)?;
            writeln!(out, "   - Error: {}", v.message)?;
            writeln!(out)?;
        }
        if *count > MARKDOWN_GROUP_LIMIT {
            writeln!(
                out,
                "*...and {} more violations*",
                count - MARKDOWN_GROUP_LIMIT
            )?;
            writeln!(out)?;
        }
        writeln!(out, "</details>")?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_markdown_directories(out: &mut String, report: &Report) -> fmt::Result {
    writeln!(out, "## Directory Structure Issues")?;
    writeln!(out)?;

    let dirs = report.directory_violations();
    if dirs.is_empty() {
        writeln!(out, "**No directory structure issues found**")?;
        return writeln!(out);
    }

    writeln!(out, "**Found {} issues**", dirs.len())?;
    writeln!(out)?;
    writeln!(out, "<details>\n<summary>Directory Structure Issues</summary>\n")?;
    for (i, v) in dirs.iter().take(MARKDOWN_GROUP_LIMIT).enumerate() {
        writeln!(out, "**{}.** `{}`", i + 1, v.file.display())?;
        writeln!(out, "   - Error: {}", v.message)?;
        writeln!(out)?;
    }
    if dirs.len() > MARKDOWN_GROUP_LIMIT {
        writeln!(out, "*...and {} more issues*", dirs.len() - MARKDOWN_GROUP_LIMIT)?;
        writeln!(out)?;
    }
    writeln!(out, "</details>")?;
    writeln!(out)
}

/// Short overview: layer coverage, counts, and the most frequent layer pairs.
pub fn render_summary(report: &Report) -> Result<String, fmt::Error> {
    render(|out| {
        let structure = report.structure();
        let total = structure.layers.len();
        let missing = &structure.missing_layers;

        writeln!(out, "=== FSD Architecture Summary ===")?;
        writeln!(out)?;
        writeln!(out, "Layers: {}/{total} present", total - missing.len())?;
        if !missing.is_empty() {
            writeln!(out, "Missing layers: {}", missing.join(", "))?;
        }
        writeln!(out)?;

        if report.is_clean() {
            return writeln!(out, "No architectural violations found");
        }

        writeln!(
            out,
            "Found {} import violation(s) and {} directory issue(s)",
            report.import_total(),
            report.directory_total()
        )?;

        let mut pairs = report.layer_pairs();
        if pairs.is_empty() {
            return Ok(());
        }
        pairs.sort_by(|a, b| b.1.cmp(&a.1));

        writeln!(out)?;
        writeln!(out, "Top layer violations:")?;
        for ((from, to), count) in pairs.iter().take(SUMMARY_TOP_PAIRS) {
            writeln!(out, "  {from} → {to}: {count}")?;
        }
        Ok(())
    })
}
