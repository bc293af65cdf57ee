//! LMN attack experiments: CLI
//!
//! Usage:
//!   lmn-attack --mode=quick
//!   lmn-attack --mode=scan [--n=64] [--k=1] [--crps=20000] [--test-crps=10000]
//!                          [--degrees=1,2] [--transforms=none,xor,double-xor,tff]
//!                          [--noisiness=0.0] [--key=0x9284758302857311] [--seed=10]
//!                          [--max-basis=4194304] [--out=data/lmn_results.json]
//!
//! Modes:
//!   quick  fast smoke test: small n, degree 1, every transform
//!   scan   full experiment; results written as JSON

use lmn_attack::experiment::{print_summary, run_experiment, ExperimentConfig};
use puf_core::ChallengeTransform;
use std::collections::HashMap;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);

    let mode = opts.get("mode").map(|s| s.as_str()).unwrap_or("scan");

    match mode {
        "quick" => run_quick(),
        "scan" => run_scan(&opts),
        other => {
            eprintln!("Unknown mode: {other}. Use --mode=quick|scan");
            std::process::exit(1);
        }
    }
}

fn run_quick() {
    println!("LMN QUICK mode: smoke test (n=32, degree 1)");
    let config = ExperimentConfig {
        n: 32,
        training_crps: 5000,
        test_crps: 2000,
        degrees: vec![1],
        ..ExperimentConfig::default()
    };
    run(&config, None);
}

fn run_scan(opts: &HashMap<String, String>) {
    let defaults = ExperimentConfig::default();
    let transforms = match parse_transforms(opts, &defaults.transforms) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let degrees = match parse_list(opts, "degrees", &defaults.degrees) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let config = ExperimentConfig {
        n: parse_usize(opts, "n", defaults.n),
        k: parse_usize(opts, "k", defaults.k),
        training_crps: parse_usize(opts, "crps", defaults.training_crps),
        test_crps: parse_usize(opts, "test-crps", defaults.test_crps),
        degrees,
        noisiness: parse_f64(opts, "noisiness", defaults.noisiness),
        transforms,
        key: parse_u64(opts, "key", defaults.key),
        puf_seed: parse_u64(opts, "seed", defaults.puf_seed),
        max_basis_size: parse_usize(opts, "max-basis", defaults.max_basis_size),
        ..defaults
    };

    println!("LMN SCAN mode: {}-XOR Arbiter PUF, n={}", config.k, config.n);
    println!("Degrees: {:?}", config.degrees);
    println!(
        "Transforms: {}",
        config.transforms.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
    );
    println!("Key: 0x{:016x}, PUF seed: {}\n", config.key, config.puf_seed);

    let out = opts
        .get("out")
        .cloned()
        .unwrap_or_else(|| "data/lmn_results.json".to_string());
    run(&config, Some(&out));
}

fn run(config: &ExperimentConfig, out: Option<&str>) {
    match run_experiment(config) {
        Ok(result) => {
            print_summary(&result);
            if let Some(path) = out {
                write_json(&result, path);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_args(args: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for arg in args {
        if let Some(kv) = arg.strip_prefix("--") {
            if let Some((k, v)) = kv.split_once('=') {
                map.insert(k.to_string(), v.to_string());
            } else {
                map.insert(kv.to_string(), "true".to_string());
            }
        }
    }
    map
}

fn parse_u64(opts: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    opts.get(key)
        .and_then(|v| {
            if let Some(hex) = v.strip_prefix("0x") {
                u64::from_str_radix(hex, 16).ok()
            } else {
                v.parse().ok()
            }
        })
        .unwrap_or(default)
}

fn parse_usize(opts: &HashMap<String, String>, key: &str, default: usize) -> usize {
    opts.get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_f64(opts: &HashMap<String, String>, key: &str, default: f64) -> f64 {
    opts.get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_list(
    opts: &HashMap<String, String>,
    key: &str,
    default: &[usize],
) -> Result<Vec<usize>, String> {
    let Some(v) = opts.get(key) else {
        return Ok(default.to_vec());
    };
    v.split(',')
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|_| format!("invalid value {s:?} in --{key}"))
        })
        .collect()
}

fn parse_transforms(
    opts: &HashMap<String, String>,
    default: &[ChallengeTransform],
) -> puf_core::Result<Vec<ChallengeTransform>> {
    match opts.get("transforms") {
        Some(v) => v.split(',').map(|s| s.parse::<ChallengeTransform>()).collect(),
        None => Ok(default.to_vec()),
    }
}

fn write_json<T: serde::Serialize>(value: &T, path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Warning: could not create directory {parent:?}: {e}");
                return;
            }
        }
    }
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Warning: could not write {path}: {e}");
            } else {
                println!("\nResults written to {path}");
            }
        }
        Err(e) => eprintln!("Warning: could not serialize results: {e}"),
    }
}
