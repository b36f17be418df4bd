//! A witness that passes `check_all` is a valid input to Groth16 proof generation.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use circuit_engine::merkle::{compute_root, inclusion_inputs, inclusion_template, MerkleTree};
use circuit_engine::synthesis::CircuitSynthesizer;
use circuit_engine::templates::multiplier;
use circuit_engine::witness::{evaluate, inputs};
use circuit_engine::{Circuit, FieldElement, Witness};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn fe(v: u64) -> FieldElement {
    FieldElement::from(v)
}

fn setup_keys(circuit: &Circuit, rng: &mut ChaCha20Rng) -> (ProvingKey<Bn254>, VerifyingKey<Bn254>) {
    Groth16::<Bn254>::circuit_specific_setup(CircuitSynthesizer::setup(circuit), rng).unwrap()
}

fn prove(pk: &ProvingKey<Bn254>, circuit: &Circuit, witness: &Witness, rng: &mut ChaCha20Rng) -> Proof<Bn254> {
    Groth16::<Bn254>::prove(pk, CircuitSynthesizer::with_witness(circuit, witness), rng).unwrap()
}

fn public_inputs(circuit: &Circuit, witness: &Witness) -> Vec<Fr> {
    witness
        .public_inputs(circuit)
        .unwrap()
        .into_iter()
        .map(FieldElement::into_fr)
        .collect()
}

#[test]
fn multiplier_proof_verifies() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let circuit = multiplier().unwrap();
    let (pk, vk) = setup_keys(&circuit, &mut rng);

    let witness = evaluate(&circuit, &inputs([("a", fe(3)), ("b", fe(4))])).unwrap();
    let proof = prove(&pk, &circuit, &witness, &mut rng);

    let public = public_inputs(&circuit, &witness);
    assert_eq!(public, vec![Fr::from(12u64), Fr::from(3u64)]);
    assert!(Groth16::<Bn254>::verify(&vk, &public, &proof).unwrap());

    // Claiming a different product must not verify.
    let forged = vec![Fr::from(13u64), Fr::from(3u64)];
    assert!(!Groth16::<Bn254>::verify(&vk, &forged, &proof).unwrap());
}

#[test]
fn proof_survives_serialization() {
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let circuit = multiplier().unwrap();
    let (pk, vk) = setup_keys(&circuit, &mut rng);
    let witness = evaluate(&circuit, &inputs([("a", fe(6)), ("b", fe(7))])).unwrap();
    let proof = prove(&pk, &circuit, &witness, &mut rng);

    let mut proof_bytes = Vec::new();
    proof.serialize_compressed(&mut proof_bytes).unwrap();
    let mut vk_bytes = Vec::new();
    vk.serialize_compressed(&mut vk_bytes).unwrap();

    let proof = Proof::<Bn254>::deserialize_compressed(&proof_bytes[..]).unwrap();
    let vk = VerifyingKey::<Bn254>::deserialize_compressed(&vk_bytes[..]).unwrap();
    assert!(Groth16::<Bn254>::verify(&vk, &public_inputs(&circuit, &witness), &proof).unwrap());
}

#[test]
fn merkle_inclusion_proof_verifies() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let leaves: Vec<FieldElement> = (10..14u64).map(fe).collect();
    let tree = MerkleTree::new(2, &leaves).unwrap();
    let circuit = inclusion_template(tree.depth()).unwrap();
    let (pk, vk) = setup_keys(&circuit, &mut rng);

    let path = tree.path(2).unwrap();
    let leaf = tree.leaf(2).unwrap();
    assert_eq!(compute_root(leaf, &path), tree.root());

    let witness = evaluate(&circuit, &inclusion_inputs(leaf, &path, tree.root())).unwrap();
    let proof = prove(&pk, &circuit, &witness, &mut rng);

    // The only public signal is the root.
    let public = public_inputs(&circuit, &witness);
    assert_eq!(public, vec![tree.root().into_fr()]);
    assert!(Groth16::<Bn254>::verify(&vk, &public, &proof).unwrap());
    assert!(!Groth16::<Bn254>::verify(&vk, &[Fr::from(0u64)], &proof).unwrap());
}
