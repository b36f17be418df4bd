mod config;
mod errors;
mod models;

use crate::config::{CircuitKind, Config};
use crate::errors::CliError;
use crate::models::{flatten_inputs, InputFile, WitnessOutput};
use circuit_engine::merkle::inclusion_template;
use circuit_engine::templates::multiplier;
use circuit_engine::{compute_witness, Circuit, CircuitError, WitnessReport};
use std::io::Write;
use std::path::Path;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), CliError> {
    // Logs go to stderr so a witness written to stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let circuit = build_circuit(&config)?;

    let raw = std::fs::read_to_string(&config.input).map_err(CliError::io(&config.input))?;
    let (report, json) = run(&circuit, &raw, &config)?;
    match &config.output {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, &json).map_err(CliError::io(path))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").map_err(CliError::io("<stdout>"))?;
        }
    }

    if let Some(path) = &config.matrices {
        let matrices = serde_json::to_string(&circuit.to_matrices())?;
        ensure_parent(path)?;
        std::fs::write(path, matrices).map_err(CliError::io(path))?;
        tracing::info!(path = %path.display(), "constraint matrices written");
    }

    if !report.is_valid() {
        return Err(CircuitError::ConstraintViolated(report.violations).into());
    }
    Ok(())
}

fn build_circuit(config: &Config) -> Result<Circuit, CliError> {
    let circuit = match config.circuit {
        CircuitKind::Multiplier => multiplier()?,
        CircuitKind::Merkle => inclusion_template(config.merkle_depth)?,
    };
    let shape = circuit.shape();
    tracing::info!(
        circuit = circuit.name(),
        constraints = shape.num_constraints,
        public = shape.num_public,
        private = shape.num_private,
        "circuit ready"
    );
    Ok(circuit)
}

/// Parse an input file, compute the witness and render it as JSON.
fn run(circuit: &Circuit, raw: &str, config: &Config) -> Result<(WitnessReport, String), CliError> {
    let file: InputFile = serde_json::from_str(raw)?;
    let report = compute_witness(circuit, &flatten_inputs(&file)?)?;

    if report.is_valid() {
        tracing::info!(circuit = circuit.name(), "witness satisfies all constraints");
    } else {
        tracing::warn!(circuit = circuit.name(), violations = ?report.violations, "witness violates constraints");
    }

    let output = WitnessOutput::new(circuit, &report, config.format)?;
    let json = serde_json::to_string_pretty(&output)?;
    Ok((report, json))
}

fn ensure_parent(path: &Path) -> Result<(), CliError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir).map_err(CliError::io(dir)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit_engine::merkle::{inclusion_inputs, MerkleTree};
    use circuit_engine::FieldElement;

    fn config(pairs: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())).unwrap()
    }

    #[test]
    fn multiplier_run() {
        let config = config(&[]);
        let circuit = build_circuit(&config).unwrap();
        let (report, json) = run(&circuit, r#"{ "a": "3", "b": "4" }"#, &config).unwrap();
        assert!(report.is_valid());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["circuit"], "multiplier");
        assert_eq!(value["public"], serde_json::json!(["12", "3"]));
    }

    #[test]
    fn merkle_run_from_circom_style_input() {
        let config = config(&[("WITNESS_CIRCUIT", "merkle"), ("MERKLE_DEPTH", "2")]);
        let circuit = build_circuit(&config).unwrap();

        let leaves: Vec<FieldElement> = (1..=4u64).map(FieldElement::from).collect();
        let tree = MerkleTree::new(2, &leaves).unwrap();
        let path = tree.path(1).unwrap();
        let inputs = inclusion_inputs(leaves[1], &path, tree.root());
        let raw = serde_json::json!({
            "root": inputs["root"],
            "leaf": inputs["leaf"],
            "path_elements": [inputs["path_elements[0]"], inputs["path_elements[1]"]],
            "path_indices": [inputs["path_indices[0]"], inputs["path_indices[1]"]],
        })
        .to_string();

        let (report, _) = run(&circuit, &raw, &config).unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn missing_input_is_an_error() {
        let config = config(&[]);
        let circuit = build_circuit(&config).unwrap();
        let err = run(&circuit, r#"{ "a": "3" }"#, &config).unwrap_err();
        assert!(matches!(err, CliError::Circuit(CircuitError::MissingInput(name)) if name == "b"));
    }

    #[test]
    fn malformed_input_is_an_error() {
        let config = config(&[]);
        let circuit = build_circuit(&config).unwrap();
        assert!(matches!(run(&circuit, "[1, 2]", &config), Err(CliError::Json(_))));
        assert!(matches!(
            run(&circuit, r#"{ "a": [3], "a[0]": 1, "b": 4 }"#, &config),
            Err(CliError::DuplicateInput(name)) if name == "a[0]"
        ));
    }
}
