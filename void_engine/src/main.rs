//! void_engine — interactive entry point.

use tracing_subscriber::EnvFilter;

use void_engine::{run, EngineConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        VOID ENGINE — Cursed Energy Technique Engine          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Mode: keyboard simulation (two synthetic hands)");
    println!();
    println!("  WASD         move left hand       Arrows  move right hand");
    println!("  C            left crossed fingers → spawn BLUE");
    println!("  F            left fist            → dismiss Blue");
    println!("  1 / 2        toggle hand visibility (spread hands → spawn RED)");
    println!("  K            right fist           → dismiss Red");
    println!("  drive Blue into Red               → PURPLE merge");
    println!("  M            right crossed fingers while Purple → DOMAIN EXPANSION");
    println!("  Q            quit");
    println!();

    let cfg = parse_args();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn parse_args() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
                    cfg.rng_seed = seed;
                }
            }
            "--help" | "-h" => {
                println!("Usage: void_engine [--seed <u64>]");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other} (try --help)");
                std::process::exit(2);
            }
        }
    }
    cfg
}
