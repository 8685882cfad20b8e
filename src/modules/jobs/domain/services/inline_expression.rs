//! Expansion of sharding inline expressions.
//!
//! Supported forms, freely combined inside one segment:
//! - ranges: `t_order_${0..3}`
//! - lists: `ds_${['a', 'b']}` or `ds_${a, b}`
//! - the `$->{...}` placeholder spelling
//!
//! Top-level commas separate independent segments. Multiple placeholders in a
//! segment expand to their cartesian product, left to right.
//!
//! An expression may expand to at most [`MAX_EXPANDED_NODES`] values; larger
//! ranges or products are rejected before they are materialized.

use crate::shared::errors::{ScalingError, ScalingResult};
use regex::Regex;

const PLACEHOLDER: &str = r"\$(?:->)?\{([^}]*)\}";

/// Upper bound on the values one expression may produce
pub const MAX_EXPANDED_NODES: usize = 10_000;

fn too_large(expression: &str) -> ScalingError {
    ScalingError::InvalidConfiguration(format!(
        "'{}' expands to more than {} values",
        expression, MAX_EXPANDED_NODES
    ))
}

pub fn expand(expression: &str) -> ScalingResult<Vec<String>> {
    let placeholder = Regex::new(PLACEHOLDER)
        .map_err(|e| ScalingError::InvalidConfiguration(format!("Bad placeholder pattern: {}", e)))?;

    let mut result = Vec::new();
    for segment in split_top_level(expression)? {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        result.extend(expand_segment(&placeholder, segment)?);
        if result.len() > MAX_EXPANDED_NODES {
            return Err(too_large(expression));
        }
    }
    Ok(result)
}

fn split_top_level(expression: &str) -> ScalingResult<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in expression.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| unbalanced(expression))?;
            }
            ',' if depth == 0 => {
                segments.push(&expression[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced(expression));
    }
    segments.push(&expression[start..]);
    Ok(segments)
}

fn unbalanced(expression: &str) -> ScalingError {
    ScalingError::InvalidConfiguration(format!("Unbalanced braces in '{}'", expression))
}

fn expand_segment(placeholder: &Regex, segment: &str) -> ScalingResult<Vec<String>> {
    let mut partials = vec![String::new()];
    let mut cursor = 0;

    for captures in placeholder.captures_iter(segment) {
        let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let literal = &segment[cursor..whole.start()];
        let values = placeholder_values(body.as_str())?;
        if partials.len().saturating_mul(values.len()) > MAX_EXPANDED_NODES {
            return Err(too_large(segment));
        }

        partials = partials
            .iter()
            .flat_map(|prefix| {
                values
                    .iter()
                    .map(move |value| format!("{}{}{}", prefix, literal, value))
            })
            .collect();
        cursor = whole.end();
    }

    let tail = &segment[cursor..];
    Ok(partials
        .into_iter()
        .map(|partial| format!("{}{}", partial, tail))
        .collect())
}

fn placeholder_values(body: &str) -> ScalingResult<Vec<String>> {
    let body = body.trim();

    if let Some((from, to)) = body.split_once("..") {
        if let (Ok(from), Ok(to)) = (from.trim().parse::<i64>(), to.trim().parse::<i64>()) {
            if from.abs_diff(to) >= MAX_EXPANDED_NODES as u64 {
                return Err(too_large(body));
            }
            let values: Vec<String> = if from <= to {
                (from..=to).map(|v| v.to_string()).collect()
            } else {
                (to..=from).rev().map(|v| v.to_string()).collect()
            };
            return Ok(values);
        }
    }

    let list = body
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(body);
    let values: Vec<String> = list
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if values.is_empty() {
        return Err(ScalingError::InvalidConfiguration(format!(
            "Empty placeholder '${{{}}}'",
            body
        )));
    }
    Ok(values)
}
