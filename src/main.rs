//! Remuster CLI.
//!
//! Loads a conversion request from a JSON file, converts every country's
//! armies, and writes a JSON report to stdout. Diagnostics go to stderr
//! through env_logger; set RUST_LOG=debug to watch units dissolve.
//!
//! Usage:
//!   remuster REQUEST.json [OPTIONS]
//!
//! Options:
//!   --seed N      Random seed, 0 for entropy (default: 0)
//!   --threads N   Number of parallel threads (default: 1)
//!   --compact     Emit the report on one line

use std::env;
use std::process;

use remuster::convert::{convert_all, CountryForces};
use remuster::request::ConversionRequest;
use remuster::roster::ALL_CATEGORIES;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut request_path: Option<String> = None;
    let mut seed: u64 = 0;
    let mut threads: usize = 1;
    let mut compact = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                seed = parse_arg(&args, i, "--seed");
            }
            "--threads" => {
                i += 1;
                threads = parse_arg(&args, i, "--threads");
            }
            "--compact" => {
                compact = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other if request_path.is_none() && !other.starts_with('-') => {
                request_path = Some(other.to_string());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let request_path = match request_path {
        Some(p) => p,
        None => {
            print_usage();
            process::exit(1);
        }
    };

    let loaded = ConversionRequest::from_path(&request_path)
        .and_then(ConversionRequest::build)
        .unwrap_or_else(|e| {
            eprintln!("{}: {}", request_path, e);
            process::exit(1);
        });

    let forces = convert_all(&loaded.context(), &loaded.countries, seed, threads);
    let report = report_json(&forces);

    let rendered = if compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("failed to render report: {}", e);
            process::exit(1);
        }
    }
}

/// Builds the output report for all converted countries.
fn report_json(forces: &[CountryForces]) -> serde_json::Value {
    let countries: Vec<serde_json::Value> = forces
        .iter()
        .map(|country| {
            let armies: Vec<serde_json::Value> = country
                .armies
                .iter()
                .map(|army| {
                    let regiments: Vec<serde_json::Value> = army
                        .regiments()
                        .iter()
                        .map(|r| {
                            serde_json::json!({
                                "category": r.category.name(),
                                "name": r.name,
                                "home": r.home.map(|id| id.0),
                            })
                        })
                        .collect();
                    serde_json::json!({
                        "name": army.name,
                        "navy": army.is_navy,
                        "location": army.location.0,
                        "regiments": regiments,
                    })
                })
                .collect();

            let mut unplaced = serde_json::Map::new();
            for category in ALL_CATEGORIES {
                let value = country.unplaced_remainder[category as usize];
                if value > 0.0 {
                    unplaced.insert(category.name().to_string(), value.into());
                }
            }

            serde_json::json!({
                "tag": country.tag.as_str(),
                "armies": armies,
                "dissolved_units": country.dissolved_units,
                "unplaced_remainder": unplaced,
            })
        })
        .collect();

    serde_json::json!({ "countries": countries })
}

fn parse_arg<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i)
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("invalid {} value", flag);
            process::exit(1);
        })
}

fn print_usage() {
    eprintln!("Usage: remuster REQUEST.json [--seed N] [--threads N] [--compact]");
    eprintln!();
    eprintln!("Converts the source armies in REQUEST.json into destination");
    eprintln!("rosters and writes a JSON report to stdout.");
}
