use puf_core::metrics::{accuracy, bias, reliability, similarity, uniqueness};
use puf_core::{
    all_inputs, key_from_u64, random_inputs, ChallengeResponseSet, ChallengeTransform, Simulation,
    XorArbiterPuf,
};

#[test]
fn test_puf_reproduces_its_own_crps() {
    let puf = XorArbiterPuf::new(32, 2, 1).unwrap();
    let crps = ChallengeResponseSet::from_simulation(&puf, 500, 2).unwrap();
    assert_eq!(crps.len(), 500);
    assert_eq!(crps.challenge_length(), 32);
    assert_eq!(accuracy(&puf, &crps).unwrap(), vec![1.0]);
}

#[test]
fn test_similarity_same_and_different_seed() {
    let a = XorArbiterPuf::new(64, 4, 1).unwrap();
    let b = XorArbiterPuf::new(64, 4, 1).unwrap();
    let c = XorArbiterPuf::new(64, 4, 2).unwrap();
    assert_eq!(similarity(&a, &b, 31415, 1000).unwrap(), vec![1.0]);
    let diff = similarity(&a, &c, 31415, 1000).unwrap()[0];
    assert!(diff > 0.35 && diff < 0.65, "independent 4-XOR PUFs agree on {diff}");
}

#[test]
fn test_similarity_rejects_length_mismatch() {
    let a = XorArbiterPuf::new(16, 1, 1).unwrap();
    let b = XorArbiterPuf::new(32, 1, 1).unwrap();
    assert!(similarity(&a, &b, 0, 10).is_err());
}

#[test]
fn test_uniqueness_of_independent_instances() {
    let pufs: Vec<XorArbiterPuf> = (0..5).map(|s| XorArbiterPuf::new(64, 1, s).unwrap()).collect();
    let refs: Vec<&dyn Simulation> = pufs.iter().map(|p| p as &dyn Simulation).collect();
    let u = uniqueness(&refs, 31415, 1000).unwrap()[0];
    assert!(u > 0.5 && u <= 1.0, "uniqueness = {u}");
}

#[test]
fn test_reliability_noise_free_vs_noisy() {
    let clean = XorArbiterPuf::new(32, 2, 1).unwrap();
    let rel = reliability(&clean, 2, 300, 9).unwrap();
    assert!(rel.iter().all(|r| r[0] == 1.0));

    let noisy = XorArbiterPuf::with_noisiness(32, 2, 1, 0.5).unwrap();
    let rel = reliability(&noisy, 2, 300, 9).unwrap();
    let avg = rel.iter().map(|r| r[0]).sum::<f64>() / rel.len() as f64;
    assert!(avg < 1.0 && avg > 0.5, "noisy reliability = {avg}");
}

#[test]
fn test_bias_in_range() {
    let puf = XorArbiterPuf::new(64, 2, 2).unwrap();
    let b = bias(&puf, 2, 1000).unwrap()[0];
    assert!((-1.0..=1.0).contains(&b));
}

#[test]
fn test_transformed_crps_differ_from_plain() {
    let puf = XorArbiterPuf::new(16, 1, 4).unwrap();
    let challenges = random_inputs(16, 200, 5);
    let key = key_from_u64(0x9284, 16);
    let (transformed, next_key) = ChallengeTransform::XorKey.apply(&challenges, &key).unwrap();
    assert_eq!(next_key, key);
    let plain = puf.eval(&challenges).unwrap();
    let hidden = puf.eval(&transformed).unwrap();
    assert_ne!(plain, hidden);
}

#[test]
fn test_all_inputs_are_valid_challenges() {
    let inputs = all_inputs(4);
    let crps = ChallengeResponseSet::new(inputs, vec![vec![1.0]; 16]).unwrap();
    assert_eq!(crps.len(), 16);
}
