//! Glymour CLI - PC-algorithm structure learning over delimited tables
//!
//! Usage:
//!   glymour <file>                          # Learn a skeleton and print a summary
//!   glymour <file> --classes age=4          # Quantize a column into 4 classes
//!   glymour <file> --orientations -o json   # Also enumerate compatible DAGs, as JSON

use clap::Parser;
use glymour_core::engine::bayes_net::NetworkStructure;
use glymour_core::engine::graph::DirectedGraph;
use glymour_core::{
    LearnError, LearnedStructure, LearnerConfig, LearningNet, SweepRule, Variable, VariableContainer,
    VariableId,
};
use std::collections::HashMap;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glymour")]
#[command(version)]
#[command(about = "Glymour - PC-algorithm Bayesian network structure learning")]
#[command(
    long_about = "Learn a Bayesian network skeleton and its collider orientations from a delimited table with a header row"
)]
struct Cli {
    /// Input table (first row is the header)
    #[arg(value_name = "FILE")]
    file: String,

    /// Significance level for the chi-square independence test
    #[arg(short, long, default_value_t = 0.05, value_name = "ALPHA")]
    alpha: f64,

    /// Quantize a column into K evenly spaced classes (repeatable)
    #[arg(short, long, value_name = "NAME=K")]
    classes: Vec<String>,

    /// Column delimiter
    #[arg(short, long, default_value_t = ',', value_name = "CHAR")]
    delimiter: char,

    /// Largest conditioning-set size to test
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Stop after the first round that removes no edge
    #[arg(long)]
    until_stable: bool,

    /// Enumerate every DAG compatible with the learned structure
    #[arg(long)]
    orientations: bool,

    /// Output format: summary, json, or debug
    #[arg(short, long, default_value = "summary", value_name = "FORMAT")]
    output: String,

    /// Log learning rounds to stderr
    #[arg(short, long)]
    verbose: bool,
}

type Row = Vec<Option<f64>>;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = match std::fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.file, e);
            process::exit(1);
        }
    };

    let classes = match parse_classes(&cli.classes) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid --classes: {}", e);
            process::exit(2);
        }
    };

    let (header, rows) = match parse_table(&source, cli.delimiter) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error parsing '{}': {}", cli.file, e);
            process::exit(1);
        }
    };

    for name in classes.keys() {
        if !header.iter().any(|h| h == name) {
            eprintln!("Invalid --classes: no column named '{}'", name);
            process::exit(2);
        }
    }

    let variables = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let variable = Variable::named(name, move |row: &Row| row.get(i).copied().flatten());
            match classes.get(name) {
                Some(&k) => variable.with_classes(k),
                None => variable,
            }
        })
        .collect();

    let container = match VariableContainer::new(rows, variables) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading variables: {}", e);
            process::exit(1);
        }
    };
    tracing::debug!(
        rows = container.len(),
        variables = container.variable_count(),
        "loaded table"
    );

    let config = LearnerConfig {
        significance: cli.alpha,
        sweep: if cli.until_stable {
            SweepRule::UntilStable
        } else {
            SweepRule::Exhaustive
        },
        max_depth: cli.max_depth,
    };

    let mut net = match LearningNet::from_container(&container, config) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let learned = net.learn_structure();

    let orientations = if cli.orientations {
        match net.compatible_orientations() {
            Ok(dags) => Some(dags),
            Err(e) => {
                eprintln!("Error enumerating orientations: {}", e);
                process::exit(1);
            }
        }
    } else {
        None
    };

    let name = |id: &VariableId| container.name(*id).unwrap_or("?").to_string();

    match cli.output.as_str() {
        "json" => {
            let value = match format_learned(&learned, orientations.as_deref(), &name) {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("Error exporting orientations: {}", e);
                    process::exit(1);
                }
            };
            match serde_json::to_string_pretty(&value) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing to JSON: {}", e);
                    process::exit(1);
                }
            }
        }
        "debug" => {
            println!("{:#?}", learned);
            if let Some(dags) = &orientations {
                println!("{:#?}", dags);
            }
        }
        _ => print_summary(&cli.file, &learned, orientations.as_deref(), &name),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("glymour_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `NAME=K` pairs into a name -> class count map.
fn parse_classes(specs: &[String]) -> Result<HashMap<String, usize>, String> {
    let mut out = HashMap::new();
    for spec in specs {
        let (name, k) = spec
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=K, got '{}'", spec))?;
        let k: usize = k
            .trim()
            .parse()
            .map_err(|_| format!("class count for '{}' is not a number: '{}'", name, k))?;
        out.insert(name.trim().to_string(), k);
    }
    Ok(out)
}

/// Header names plus one row of optional values per data line.
///
/// `true`/`false` read as 1/0; empty or unparseable cells are missing.
fn parse_table(source: &str, delimiter: char) -> Result<(Vec<String>, Vec<Row>), String> {
    let mut lines = source.lines().filter(|l| !l.trim().is_empty());
    let header: Vec<String> = lines
        .next()
        .ok_or("file is empty")?
        .split(delimiter)
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let row: Row = line.split(delimiter).map(parse_cell).collect();
        if row.len() != header.len() {
            return Err(format!(
                "data line {} has {} cells, header has {}",
                line_no + 1,
                row.len(),
                header.len()
            ));
        }
        rows.push(row);
    }
    Ok((header, rows))
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(0.0)
    } else {
        cell.parse().ok()
    }
}

fn print_summary(
    file: &str,
    learned: &LearnedStructure<VariableId>,
    orientations: Option<&[DirectedGraph<VariableId>]>,
    name: &dyn Fn(&VariableId) -> String,
) {
    let diagnostics = &learned.diagnostics;
    println!(
        "✓ Learned structure of '{}' in {} rounds ({} independence tests)\n",
        file,
        diagnostics.rounds.len(),
        diagnostics.total_oracle_calls()
    );

    let edges = learned.skeleton.edges();
    println!("Skeleton ({} edges):", edges.len());
    for (a, b) in &edges {
        println!("  {} - {}", name(a), name(b));
    }

    if !learned.directed_edges.is_empty() {
        println!("\nDirected ({}):", learned.directed_edges.len());
        for (src, dst) in learned.directed_edges.iter() {
            println!("  {} -> {}", name(src), name(dst));
        }
    }

    if !learned.separating_sets.is_empty() {
        println!("\nSeparating sets ({}):", learned.separating_sets.len());
        for ((a, b), given) in &learned.separating_sets {
            let given: Vec<String> = given.iter().map(name).collect();
            println!("  {} _||_ {} | {{{}}}", name(a), name(b), given.join(", "));
        }
    }

    if !diagnostics.oracle_failures.is_empty() {
        println!("\nFailed tests ({}):", diagnostics.oracle_failures.len());
        for failure in &diagnostics.oracle_failures {
            println!(
                "  {} vs {}: {}",
                name(&failure.pair.0),
                name(&failure.pair.1),
                failure.error
            );
        }
    }

    if let Some(dags) = orientations {
        println!("\nCompatible orientations ({}):", dags.len());
        for (i, dag) in dags.iter().enumerate() {
            let edges: Vec<String> = dag
                .edges()
                .iter()
                .map(|(s, d)| format!("{} -> {}", name(s), name(d)))
                .collect();
            println!("  [{}] {}", i, edges.join(", "));
        }
    }
}

/// Format a learned structure for JSON serialization
fn format_learned(
    learned: &LearnedStructure<VariableId>,
    orientations: Option<&[DirectedGraph<VariableId>]>,
    name: &dyn Fn(&VariableId) -> String,
) -> Result<serde_json::Value, LearnError> {
    use serde_json::json;

    let skeleton: Vec<_> = learned
        .skeleton
        .edges()
        .iter()
        .map(|(a, b)| json!([name(a), name(b)]))
        .collect();
    let directed: Vec<_> = learned
        .directed_edges
        .iter()
        .map(|(s, d)| json!([name(s), name(d)]))
        .collect();
    let separating: Vec<_> = learned
        .separating_sets
        .iter()
        .map(|((a, b), given)| {
            json!({
                "pair": [name(a), name(b)],
                "given": given.iter().map(name).collect::<Vec<_>>(),
            })
        })
        .collect();
    let failures: Vec<_> = learned
        .diagnostics
        .oracle_failures
        .iter()
        .map(|f| {
            json!({
                "pair": [name(&f.pair.0), name(&f.pair.1)],
                "given": f.conditioning.iter().map(name).collect::<Vec<_>>(),
                "error": f.error.to_string(),
            })
        })
        .collect();
    let rounds: Vec<_> = learned
        .diagnostics
        .rounds
        .iter()
        .map(|r| {
            json!({
                "depth": r.depth,
                "edges": r.edges_considered,
                "skipped": r.edges_skipped,
                "tests": r.oracle_calls,
                "removed": r.edges_removed,
            })
        })
        .collect();

    let mut output = json!({
        "skeleton": skeleton,
        "directed": directed,
        "separating_sets": separating,
        "rounds": rounds,
        "oracle_failures": failures,
    });

    if let Some(dags) = orientations {
        let networks = dags
            .iter()
            .enumerate()
            .map(|(i, dag)| {
                let net = NetworkStructure::from_dag(format!("orientation_{}", i), dag, name)?;
                Ok(json!({ "title": net.title, "parents": net.parents }))
            })
            .collect::<Result<Vec<_>, LearnError>>()?;
        output["orientations"] = json!(networks);
    }

    Ok(output)
}
