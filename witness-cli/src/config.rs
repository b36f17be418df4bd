//! Environment-driven settings for a single witness run.

use crate::errors::CliError;
use circuit_engine::constants::{DEFAULT_MERKLE_DEPTH, MAX_TREE_DEPTH};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircuitKind {
    Multiplier,
    Merkle,
}

impl FromStr for CircuitKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiplier" => Ok(CircuitKind::Multiplier),
            "merkle" => Ok(CircuitKind::Merkle),
            other => Err(CliError::InvalidConfig(format!(
                "WITNESS_CIRCUIT must be `multiplier` or `merkle`, got {other:?}"
            ))),
        }
    }
}

/// How field elements are written to the output file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Decimal,
    /// Compressed little-endian encoding, hex encoded.
    Hex,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decimal" => Ok(OutputFormat::Decimal),
            "hex" => Ok(OutputFormat::Hex),
            other => Err(CliError::InvalidConfig(format!(
                "WITNESS_FORMAT must be `decimal` or `hex`, got {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub circuit: CircuitKind,
    pub input: PathBuf,
    /// `None` writes the witness to stdout.
    pub output: Option<PathBuf>,
    /// Where to export the constraint matrices, if anywhere.
    pub matrices: Option<PathBuf>,
    pub format: OutputFormat,
    pub merkle_depth: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or empty keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let circuit = match get("WITNESS_CIRCUIT") {
            Some(v) => v.parse()?,
            None => CircuitKind::Multiplier,
        };
        let format = match get("WITNESS_FORMAT") {
            Some(v) => v.parse()?,
            None => OutputFormat::default(),
        };
        let merkle_depth = match get("MERKLE_DEPTH") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|_| CliError::InvalidConfig(format!("MERKLE_DEPTH is not a number: {v:?}")))?,
            None => DEFAULT_MERKLE_DEPTH,
        };
        if merkle_depth > MAX_TREE_DEPTH {
            return Err(CliError::InvalidConfig(format!(
                "MERKLE_DEPTH {merkle_depth} exceeds the maximum of {MAX_TREE_DEPTH}"
            )));
        }

        Ok(Self {
            circuit,
            input: PathBuf::from(get("WITNESS_INPUT").unwrap_or_else(|| "input.json".to_string())),
            output: get("WITNESS_OUTPUT").map(PathBuf::from),
            matrices: get("WITNESS_MATRICES").map(PathBuf::from),
            format,
            merkle_depth,
        })
    }
}
