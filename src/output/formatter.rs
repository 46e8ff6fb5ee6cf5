use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::assessment::AssessmentDocument;
use crate::config::ColorMode;
use crate::scoring::{fuk_color_class, fuk_label, score_to_fuk, AggregatedResult};

/// Width of the numeric/label block at the end of each tree line:
/// score (8) + fuk (6) + label (11) + separators
const METRICS_WIDTH: usize = 8 + 2 + 6 + 2 + 11;

/// Decide whether to color output for the given mode
pub fn should_use_colors(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

/// Format a score with a fixed number of decimals
pub fn format_value(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

/// Apply the color belonging to a FUK bucket
fn paint(text: &str, fuk: f64, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match fuk_color_class(fuk) {
        "fuk-excellent" => text.green().to_string(),
        "fuk-good" => text.cyan().to_string(),
        "fuk-fair" => text.yellow().to_string(),
        "fuk-poor" => text.red().to_string(),
        _ => text.dimmed().to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a node name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

struct TreeLine<'a> {
    depth: usize,
    kind: &'static str,
    code: Option<&'a str>,
    id: &'a str,
    name: &'a str,
    score: f64,
    fuk: f64,
}

fn render_line(line: &TreeLine, precision: usize, width: Option<usize>, use_colors: bool) -> String {
    let indent = "  ".repeat(line.depth);
    let reference = line.code.unwrap_or(line.id);
    let head = format!("{}{} {}", indent, line.kind, reference);

    let name = match width {
        Some(w) if w > head.chars().count() + METRICS_WIDTH + 10 => {
            truncate_name(line.name, w - head.chars().count() - METRICS_WIDTH - 3)
        }
        Some(_) => truncate_name(line.name, 20),
        None => line.name.to_string(),
    };

    let score = format!("{:>8}", format_value(line.score, precision));
    let fuk = format!("{:>6}", format_value(line.fuk, 2));
    let label = format!("{:<11}", fuk_label(line.fuk));

    let head = if use_colors {
        head.bold().to_string()
    } else {
        head
    };

    format!(
        "{}  {}  {}  {}  {}",
        head,
        name,
        score,
        paint(&fuk, line.fuk, use_colors),
        paint(&label, line.fuk, use_colors)
    )
    .trim_end()
    .to_string()
}

/// Format the scored tree, one line per node, indented by level.
/// Each line ends with the node's score, FUK and FUK label.
pub fn format_result_tree(result: &AggregatedResult, precision: usize, use_colors: bool) -> String {
    if result.kkas.is_empty() {
        return "Assessment has no KKAs.".to_string();
    }

    let width = get_terminal_width();
    let mut lines = Vec::new();

    for kka in &result.kkas {
        lines.push(TreeLine {
            depth: 0,
            kind: "KKA",
            code: kka.code.as_deref(),
            id: &kka.id,
            name: &kka.name,
            score: kka.score,
            fuk: kka.fuk,
        });
        for aspect in &kka.aspects {
            lines.push(TreeLine {
                depth: 1,
                kind: "Aspect",
                code: aspect.code.as_deref(),
                id: &aspect.id,
                name: &aspect.name,
                score: aspect.score,
                fuk: aspect.fuk,
            });
            for parameter in &aspect.parameters {
                lines.push(TreeLine {
                    depth: 2,
                    kind: "Parameter",
                    code: parameter.code.as_deref(),
                    id: &parameter.id,
                    name: &parameter.name,
                    score: parameter.score,
                    fuk: parameter.fuk,
                });
                for factor in &parameter.factors {
                    lines.push(TreeLine {
                        depth: 3,
                        kind: "Factor",
                        code: factor.code.as_deref(),
                        id: &factor.id,
                        name: &factor.name,
                        score: factor.score,
                        fuk: factor.fuk,
                    });
                }
            }
        }
    }

    lines
        .iter()
        .map(|line| render_line(line, precision, width, use_colors))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-paragraph summary of an assessment and its overall result
pub fn format_summary(
    document: &AssessmentDocument,
    result: &AggregatedResult,
    precision: usize,
    use_colors: bool,
) -> String {
    let title = if document.title.is_empty() {
        document.id.clone()
    } else {
        format!("{} ({})", document.title, document.id)
    };
    let title = if use_colors {
        title.bold().to_string()
    } else {
        title
    };

    let fuk = format!(
        "{} {}",
        format_value(result.overall_fuk, 2),
        fuk_label(result.overall_fuk)
    );

    format!(
        "{}\n  Framework: {}  Status: {}\n  Overall score: {}  FUK: {}\n  Factors completed: {}/{} ({:.0}%)",
        title,
        document.framework,
        document.status,
        format_value(result.overall_score, precision),
        paint(&fuk, result.overall_fuk, use_colors),
        result.completed_factors,
        result.total_factors,
        result.completion_ratio() * 100.0
    )
}

/// Describe how a single raw score is classified
pub fn format_fuk_detail(score: f64, precision: usize, use_colors: bool) -> String {
    let fuk = score_to_fuk(score);
    format!(
        "Score: {}\nFUK: {}\nLabel: {}\nClass: {}",
        format_value(score, precision),
        paint(&format_value(fuk, 2), fuk, use_colors),
        paint(fuk_label(fuk), fuk, use_colors),
        fuk_color_class(fuk)
    )
}

/// Pretty JSON for scripting and API consumers
pub fn format_json(result: &AggregatedResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize result")
}

/// Several results as a single JSON array
pub fn format_json_list(results: &[&AggregatedResult]) -> Result<String> {
    serde_json::to_string_pretty(results).context("Failed to serialize results")
}
