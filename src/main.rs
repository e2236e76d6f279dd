use std::collections::BTreeSet;
use std::env;
use std::process::ExitCode;
use std::time::Instant;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rb_tree::RbTree;

const DEFAULT_OPS: usize = 100_000;
const DEFAULT_SEED: u64 = 1;

/// Workload settings read from `RB_TREE_OPS` and `RB_TREE_SEED`.
struct DriverConfig {
    ops: usize,
    seed: u64,
}

impl DriverConfig {
    fn from_env() -> Self {
        DriverConfig {
            ops: read_var("RB_TREE_OPS", DEFAULT_OPS),
            seed: read_var("RB_TREE_SEED", DEFAULT_SEED),
        }
    }
}

fn read_var<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} = {:?} is not valid, using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn run(config: &DriverConfig) -> rb_tree::Result<bool> {
    let key_space = (config.ops as u64).max(1) * 2;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let start = Instant::now();
    let mut tree = RbTree::with_capacity(config.ops);
    let mut inserted = 0usize;
    let mut erased = 0usize;
    for _ in 0..config.ops {
        let key: u64 = rng.gen_range(0..key_space);
        if rng.gen_bool(0.7) {
            if !tree.contains(&key) {
                tree.insert(key)?;
                inserted += 1;
            }
        } else if tree.remove(&key).is_some() {
            erased += 1;
        }
    }
    let our_time = start.elapsed();
    let height = tree.height();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let start = Instant::now();
    let mut std_set = BTreeSet::new();
    for _ in 0..config.ops {
        let key: u64 = rng.gen_range(0..key_space);
        if rng.gen_bool(0.7) {
            std_set.insert(key);
        } else {
            std_set.remove(&key);
        }
    }
    let std_time = start.elapsed();

    info!(
        "{} ops: {} inserted, {} erased, {} remain, height {}",
        config.ops,
        inserted,
        erased,
        tree.len(),
        height
    );
    info!("RbTree:        {:?}", our_time);
    info!("std BTreeSet:  {:?}", std_time);

    let ours = if tree.is_empty() {
        Vec::new()
    } else {
        tree.to_array(tree.len())?
    };
    Ok(ours.iter().eq(std_set.iter()))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DriverConfig::from_env();
    info!("running {} ops with seed {}", config.ops, config.seed);
    match run(&config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("tree contents diverged from std::collections::BTreeSet");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
