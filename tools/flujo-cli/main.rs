use clap::{Parser, ValueEnum};
use flujo::prelude::*;
use std::fs;
use std::time::Instant;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeCli {
    Test,
    Run,
}

/// A deterministic execution engine CLI for node-based automation flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow JSON file (nodes, edges and configuration)
    flow_path: String,

    /// The run mode recorded in the result envelope
    #[arg(short, long, value_enum, default_value = "test")]
    mode: ModeCli,

    /// Fixed seed for chance-based branches (default: start timestamp)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the raw record as JSON instead of the formatted trace
    #[arg(long)]
    json: bool,

    /// Save the binary record to this path after the run
    #[arg(short, long)]
    archive: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    // --- 1. File Loading and Conversion ---
    let flow_json = fs::read_to_string(&cli.flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read flow file '{}': {}",
            &cli.flow_path, e
        ))
    });
    let ui_flow = UiFlow::from_json(&flow_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flow JSON: {}", e)));

    let node_configs = ui_flow.node_configs.clone();
    let template_config = ui_flow.template_config.clone();
    let flow = ui_flow
        .into_flow()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert flow: {}", e)));

    let mode = match cli.mode {
        ModeCli::Test => RunMode::Test,
        ModeCli::Run => RunMode::Run,
    };

    // --- 2. Engine Build and Execution ---
    let mut builder = Engine::builder(flow)
        .with_node_configs(node_configs)
        .with_template_config(template_config)
        .with_mode(mode);
    if let Some(seed) = cli.seed {
        builder = builder.with_seed(seed);
    }
    let mut engine = builder.build();

    let run_start = Instant::now();
    let record = engine.run();
    let run_duration = run_start.elapsed();

    // --- 3. Results ---
    if cli.json {
        let json = serde_json::to_string_pretty(&record)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize record: {}", e)));
        println!("{}", json);
    } else {
        println!("{}", TraceFormatter::format_record(&record));
    }

    println!();
    println!("Steps:    {}", record.steps.len());
    println!("Credits:  {}", record.credit_cost());
    println!("Walltime: {:?}", run_duration);

    if let Some(path) = cli.archive {
        record
            .save(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to archive record: {}", e)));
        println!("Archived: {}", path);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
