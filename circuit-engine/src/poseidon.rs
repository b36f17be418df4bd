//! Two-to-one Poseidon hash, natively and as a circuit template.
//!
//! The native side runs the `ark-crypto-primitives` sponge: absorb `left` and `right` into the
//! rate lanes of a zeroed width-3 state, permute, squeeze the first rate lane. The template
//! replays the same permutation with signals: round constants and MDS mixing stay inside linear
//! combinations, and only S-box outputs become signals (`x^5` as three multiplications).

use crate::circuit::Circuit;
use crate::constants::{poseidon_config, POSEIDON_ALPHA};
use crate::constraint::LinearCombination;
use crate::error::Result;
use crate::expr::Expr;
use crate::field::FieldElement;
use crate::signal::SignalKind;
use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::CryptographicSponge;
use std::sync::OnceLock;
use tracing::debug;

/// Parameters are derived once per process.
pub fn config() -> &'static PoseidonConfig<Fr> {
    static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();
    CONFIG.get_or_init(poseidon_config)
}

/// `Hash(left, right)`.
pub fn hash_two(left: FieldElement, right: FieldElement) -> FieldElement {
    let mut sponge = PoseidonSponge::<Fr>::new(config());
    sponge.absorb(&left.into_fr());
    sponge.absorb(&right.into_fr());
    FieldElement::from(sponge.squeeze_field_elements::<Fr>(1)[0])
}

/// Circuit computing `out = Hash(left, right)` with private inputs `left`, `right`.
pub fn hasher_template() -> Result<Circuit> {
    let cfg = config();
    let mut circuit = Circuit::new("poseidon2");
    circuit.declare("left", SignalKind::Private)?;
    circuit.declare("right", SignalKind::Private)?;
    circuit.declare("out", SignalKind::Output)?;

    let mut state = vec![LinearCombination::zero(); cfg.rate + cfg.capacity];
    state[cfg.capacity].add_term("left", FieldElement::one());
    state[cfg.capacity + 1].add_term("right", FieldElement::one());

    let half_full = cfg.full_rounds / 2;
    let rounds = cfg.full_rounds + cfg.partial_rounds;
    for round in 0..rounds {
        for (lane, k) in state.iter_mut().zip(&cfg.ark[round]) {
            lane.add_constant(FieldElement::from(*k));
        }

        let full = round < half_full || round >= half_full + cfg.partial_rounds;
        let sboxes = if full { state.len() } else { 1 };
        for (i, lane) in state.iter_mut().take(sboxes).enumerate() {
            *lane = sbox(&mut circuit, &format!("round{round}.sbox{i}"), lane)?;
        }

        state = mix(&state, &cfg.mds);
    }

    circuit.assign_constrained("out", Expr::from(state[cfg.capacity].clone()))?;
    debug!(
        signals = circuit.signals().len(),
        constraints = circuit.num_constraints(),
        "built poseidon hasher template"
    );
    Ok(circuit)
}

const _: () = assert!(POSEIDON_ALPHA == 5);

/// `x^5` through `x2 = x*x`, `x4 = x2*x2`, `x5 = x4*x`.
fn sbox(circuit: &mut Circuit, prefix: &str, x: &LinearCombination) -> Result<LinearCombination> {
    let x2 = format!("{prefix}.x2");
    let x4 = format!("{prefix}.x4");
    let x5 = format!("{prefix}.x5");
    for name in [&x2, &x4, &x5] {
        circuit.declare(name.as_str(), SignalKind::Intermediate)?;
    }

    let x = Expr::from(x.clone());
    circuit.assign_constrained(&x2, x.clone() * x.clone())?;
    circuit.assign_constrained(&x4, Expr::signal(x2.as_str()) * x2.as_str())?;
    circuit.assign_constrained(&x5, Expr::signal(x4.as_str()) * x)?;
    Ok(LinearCombination::signal(x5))
}

fn mix(state: &[LinearCombination], mds: &[Vec<Fr>]) -> Vec<LinearCombination> {
    mds.iter()
        .map(|row| {
            row.iter()
                .zip(state)
                .fold(LinearCombination::zero(), |acc, (m, lane)| acc + lane.scale(FieldElement::from(*m)))
        })
        .collect()
}
