use lmn_attack::experiment::{run_experiment, ExperimentConfig};
use lmn_attack::{
    basis_size, enumerate_parities, evaluate_degree, fit, BasisCache, FourierModel, LmnAttack,
    LmnError, OutputPolicy,
};
use puf_core::metrics::accuracy;
use puf_core::{
    all_inputs, decode_bit, random_inputs, ChallengeResponseSet, ChallengeTransform,
    LearningAttack, Simulation,
};
use std::sync::Arc;

const EPS: f64 = 1e-12;

fn fit_on(inputs: &[Vec<i8>], y: Vec<f64>, deg: usize, cache: &Arc<BasisCache>) -> FourierModel {
    let n = inputs[0].len();
    let chis = evaluate_degree(inputs, deg, cache).unwrap();
    fit(&chis, y, n, deg, Arc::clone(cache)).unwrap()
}

fn majority(x: &[i8]) -> f64 {
    let sum: i32 = x.iter().map(|&b| b as i32).sum();
    if sum > 0 {
        1.0
    } else {
        -1.0
    }
}

// ---------------------------------------------------------------------------
// Basis
// ---------------------------------------------------------------------------

#[test]
fn test_basis_n4_deg1_rendering() {
    let cache = BasisCache::new();
    let basis = cache.generate_basis(4, 1).unwrap();
    let rendered: Vec<String> = basis.iter().map(|p| p.to_string()).collect();
    assert_eq!(rendered, ["0000", "0001", "0010", "0100", "1000"]);
}

#[test]
fn test_basis_sizes_and_caching() {
    let cache = BasisCache::new();
    for n in 1..=8 {
        for deg in 0..=n {
            let first = cache.generate_basis(n, deg).unwrap();
            let again = cache.generate_basis(n, deg).unwrap();
            assert!(Arc::ptr_eq(&first, &again), "n={n}, deg={deg} not cached");
            assert_eq!(first.len() as u128, basis_size(n, deg));
            assert_eq!(*first, enumerate_parities(n, deg).unwrap());
        }
    }
    assert_eq!(cache.len(), (1..=8).map(|n| n + 1).sum::<usize>());
}

#[test]
fn test_basis_too_large() {
    let cache = BasisCache::with_max_basis_size(1000);
    let err = cache.generate_basis(64, 2).unwrap_err();
    assert!(matches!(err, LmnError::BasisTooLarge { n: 64, deg: 2, size: 2081, limit: 1000 }));
    assert!(err.to_string().contains("2081"));
}

// ---------------------------------------------------------------------------
// Parity evaluation
// ---------------------------------------------------------------------------

#[test]
fn test_evaluate_degree_one() {
    let cache = BasisCache::new();
    let chis = evaluate_degree(&[vec![1, 1, 1, 1], vec![-1, -1, -1, -1]], 1, &cache).unwrap();
    assert_eq!(chis, vec![vec![1, 1, 1, 1, 1], vec![1, -1, -1, -1, -1]]);
}

#[test]
fn test_evaluate_rejects_bits() {
    let cache = BasisCache::new();
    let err = evaluate_degree(&[vec![0, 1, 1]], 1, &cache).unwrap_err();
    assert!(matches!(err, LmnError::Puf(_)));
}

// ---------------------------------------------------------------------------
// Fit and predict
// ---------------------------------------------------------------------------

#[test]
fn test_and_exact_recovery() {
    // Inputs in order (0,0), (0,1), (1,0), (1,1); AND in ±1 encoding.
    let inputs = all_inputs(2);
    let y: Vec<f64> = vec![1.0, 1.0, 1.0, -1.0];
    let cache = Arc::new(BasisCache::new());
    let model = fit_on(&inputs, y, 2, &cache);

    let predicted = model.eval(&inputs).unwrap();
    let bits: Vec<f64> = predicted.iter().map(|row| (1.0 - row[0]) / 2.0).collect();
    assert_eq!(bits, vec![0.0, 0.0, 0.0, 1.0]);

    let decoded: Vec<u8> = predicted.iter().map(|row| decode_bit(row[0] as i8)).collect();
    assert_eq!(decoded, vec![0, 0, 0, 1]);
}

#[test]
fn test_majority3_spectrum() {
    let inputs = all_inputs(3);
    let y: Vec<f64> = inputs.iter().map(|x| majority(x)).collect();
    let cache = Arc::new(BasisCache::new());
    let model = fit_on(&inputs, y, 3, &cache);

    assert!((model.parseval_weight()[0] - 1.0).abs() < EPS);

    let basis = cache.generate_basis(3, 3).unwrap();
    for (parity, &c) in basis.iter().zip(&model.coefficients()[0]) {
        let expected = match parity.degree() {
            1 => 0.5,
            3 => -0.5,
            _ => 0.0,
        };
        assert!((c - expected).abs() < EPS, "coefficient of {parity} is {c}");
    }
}

#[test]
fn test_real_policy_round_trip() {
    let inputs = random_inputs(6, 200, 9);
    let y: Vec<f64> = inputs.iter().map(|x| x[0] as f64 * 0.3 + x[4] as f64 * 0.9).collect();
    let cache = Arc::new(BasisCache::new());
    let chis = evaluate_degree(&inputs, 2, &cache).unwrap();
    let model = fit(&chis, y, 6, 2, Arc::clone(&cache))
        .unwrap()
        .with_policy(OutputPolicy::Real);

    let predicted = model.predict(&inputs).unwrap();
    let coefs = &model.coefficients()[0];
    for (chi, out) in chis.iter().zip(&predicted) {
        let linear: f64 = chi.iter().zip(coefs).map(|(&x, &c)| x as f64 * c).sum();
        assert!((out[0] - linear).abs() < 1e-9);
    }
    assert_eq!(predicted, model.predict_raw(&inputs).unwrap());
}

#[test]
fn test_shape_errors() {
    let cache = Arc::new(BasisCache::new());
    let inputs = all_inputs(3);
    let chis = evaluate_degree(&inputs, 1, &cache).unwrap();

    assert!(matches!(
        fit(&chis, vec![1.0; 5], 3, 1, Arc::clone(&cache)),
        Err(LmnError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        fit(&chis, vec![1.0; 8], 4, 1, Arc::clone(&cache)),
        Err(LmnError::ShapeMismatch { expected: 5, found: 4, .. })
    ));

    let model = fit(&chis, vec![1.0; 8], 3, 1, Arc::clone(&cache)).unwrap();
    assert!(model.predict(&[vec![1, -1, 1, 1]]).is_err());
}

// ---------------------------------------------------------------------------
// Learning
// ---------------------------------------------------------------------------

#[test]
fn test_degree_one_learns_majority9() {
    let train = random_inputs(9, 3000, 11);
    let responses: Vec<Vec<f64>> = train.iter().map(|x| vec![majority(x)]).collect();
    let crps = ChallengeResponseSet::new(train, responses).unwrap();

    let mut attack = LmnAttack::new(crps, 1, Arc::new(BasisCache::new()));
    let model = attack.fit().unwrap();

    let test = random_inputs(9, 2000, 12);
    let truth: Vec<Vec<f64>> = test.iter().map(|x| vec![majority(x)]).collect();
    let test_set = ChallengeResponseSet::new(test, truth).unwrap();
    let acc = accuracy(model, &test_set).unwrap()[0];
    assert!(acc > 0.9, "majority accuracy {acc}");
}

#[test]
fn test_dictator_recovered_exactly() {
    let train = random_inputs(8, 1000, 5);
    let responses: Vec<Vec<f64>> = train.iter().map(|x| vec![x[3] as f64]).collect();
    let crps = ChallengeResponseSet::new(train, responses).unwrap();

    let mut attack = LmnAttack::new(crps, 1, Arc::new(BasisCache::new()));
    let model = attack.fit().unwrap();
    assert_eq!(model.coefficients()[0][4], 1.0);

    let everything = all_inputs(8);
    let truth: Vec<Vec<f64>> = everything.iter().map(|x| vec![x[3] as f64]).collect();
    let full = ChallengeResponseSet::new(everything, truth).unwrap();
    assert_eq!(accuracy(model, &full).unwrap(), vec![1.0]);
}

#[test]
fn test_small_experiment() {
    let config = ExperimentConfig {
        n: 16,
        training_crps: 3000,
        test_crps: 1000,
        similarity_samples: 1000,
        degrees: vec![1],
        ..ExperimentConfig::default()
    };
    let result = run_experiment(&config).unwrap();
    assert_eq!(result.results.len(), ChallengeTransform::ALL.len());

    for r in &result.results {
        for metric in [r.similarity, r.puf_similarity, r.accuracy] {
            assert!((0.0..=1.0).contains(&metric));
        }
        assert!(r.transform_entropy >= 0.0);
    }

    let plain = &result.results[0];
    assert_eq!(plain.transform, ChallengeTransform::Identity);
    assert_eq!(plain.similarity, plain.puf_similarity);

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"heaviest_terms\""));
}
