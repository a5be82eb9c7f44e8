//! Text-format weight file parser.
//!
//! The format is plain text: a declared total neuron count, then layer
//! sizes until their sum reaches the total, then one row of outgoing
//! weights per source neuron. `#` starts a comment anywhere on a line.
//! Content-level irregularities never fail the parse; they degrade to a
//! partial model. Only undecodable input is a hard error.

use std::path::Path;

use log::warn;
use thiserror::Error;

use crate::model::NetworkModel;

/// Errors raised at the I/O boundary. Malformed *content* is not an error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read weight file: {0}")]
    Io(#[from] std::io::Error),

    #[error("weight file is not valid UTF-8 text")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Parse raw weight-file text into a [`NetworkModel`].
///
/// Never fails: short files yield fewer layers or rows, non-numeric tokens
/// are dropped, and a non-numeric total leaves the layer list empty while
/// the remainder of the file still parses as weight rows.
pub fn parse(text: &str) -> NetworkModel {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .collect();

    let mut current = 0usize;

    let total_neurons = lines.first().and_then(|line| {
        current += 1;
        leading_int(line)
    });
    if total_neurons.is_none() && !lines.is_empty() {
        warn!("weight file declares a non-numeric neuron total; layer list will be empty");
    }

    // Greedy accumulation: consume integer lines until the declared total is
    // covered. Unparseable lines are consumed without advancing the sum. A
    // missing total makes the bound 0, so no layer lines are consumed at all.
    let mut layers = Vec::new();
    let mut neurons_parsed = 0usize;
    let total = total_neurons.unwrap_or(0);
    while neurons_parsed < total && current < lines.len() {
        if let Some(size) = leading_int(lines[current]) {
            layers.push(size);
            neurons_parsed += size;
        }
        current += 1;
    }

    // Everything left is the weight matrix. Lines with no numeric token
    // produce no row rather than an empty one.
    let mut weights_matrix = Vec::new();
    for line in &lines[current.min(lines.len())..] {
        let row: Vec<f32> = line
            .split_whitespace()
            .filter_map(|tok| tok.parse::<f32>().ok())
            .collect();
        if !row.is_empty() {
            weights_matrix.push(row);
        }
    }

    NetworkModel {
        total_neurons,
        layers,
        weights_matrix,
    }
}

/// Read and parse a weight file from disk.
pub fn load(path: impl AsRef<Path>) -> Result<NetworkModel, ParseError> {
    let bytes = std::fs::read(path.as_ref())?;
    let text = String::from_utf8(bytes)?;
    Ok(parse(&text))
}

// Unsigned integer prefix of a line, parseInt-style: "12abc" reads as 12,
// anything without a leading digit is None.
fn leading_int(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
