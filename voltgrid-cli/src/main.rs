//! Voltgrid CLI - solve grid-circuit snapshots from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use voltgrid::modules::ModuleRegistry;
use voltgrid::prelude::*;
use voltgrid::{discover_snapshot_files, load_pin_states, load_snapshot};

#[derive(Parser)]
#[command(name = "voltgrid")]
#[command(about = "Grid-circuit snapshot solver", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single snapshot file
    Solve {
        /// Path to a snapshot .json file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Optional pin-state .json file from the firmware emulator
        #[arg(long, value_name = "FILE")]
        pin_states: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if the solve reports advisory errors
        #[arg(long)]
        fail_on_errors: bool,

        /// Wire back-propagation pass cap
        #[arg(long, default_value_t = voltgrid::DEFAULT_WIRE_UPDATE_PASSES)]
        wire_passes: usize,
    },

    /// Solve every snapshot .json file in a directory
    Batch {
        /// Path to a directory of snapshot files
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if any solve reports advisory errors
        #[arg(long)]
        fail_on_errors: bool,
    },

    /// List the built-in component module definitions
    Modules {
        /// Show per-pin details
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for tooling
    Json,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Solve {
            file,
            pin_states,
            format,
            fail_on_errors,
            wire_passes,
        } => handle_solve(&file, pin_states.as_deref(), format, fail_on_errors, wire_passes),
        Commands::Batch {
            dir,
            format,
            fail_on_errors,
        } => handle_batch(&dir, format, fail_on_errors),
        Commands::Modules { verbose } => {
            handle_modules(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn handle_solve(
    file: &std::path::Path,
    pin_states_file: Option<&std::path::Path>,
    format: OutputFormat,
    fail_on_errors: bool,
    wire_passes: usize,
) -> i32 {
    let snapshot = match load_snapshot(file) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let pin_states = match pin_states_file {
        Some(path) => match load_pin_states(path) {
            Ok(states) => states,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        None => PinStates::new(),
    };

    let options = SolveOptions {
        wire_update_passes: wire_passes,
        ..SolveOptions::default()
    };

    let result = CircuitCore::solve(&snapshot, &pin_states, &options);
    output_results(std::slice::from_ref(&result), &[file.to_path_buf()], &format);

    if fail_on_errors && !result.summary.errors.is_empty() {
        return 1;
    }
    0
}

fn handle_batch(dir: &std::path::Path, format: OutputFormat, fail_on_errors: bool) -> i32 {
    let files = match discover_snapshot_files(dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut results = Vec::new();
    let mut solved_files = Vec::new();
    for path in files {
        match load_snapshot(&path) {
            Ok(snapshot) => {
                let result =
                    CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());
                results.push(result);
                solved_files.push(path);
            }
            Err(e) => {
                eprintln!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    output_results(&results, &solved_files, &format);

    if fail_on_errors && results.iter().any(|r| !r.summary.errors.is_empty()) {
        return 1;
    }
    0
}

fn output_results(results: &[SolveResult], files: &[PathBuf], format: &OutputFormat) {
    match format {
        OutputFormat::Human => output_human(results, files),
        OutputFormat::Json => output_json(results, files),
    }
}

fn output_human(results: &[SolveResult], files: &[PathBuf]) {
    for (result, file) in results.iter().zip(files) {
        println!("\nSnapshot: {}", file.display());
        println!("{}", "─".repeat(60));

        println!(
            "  Total: {:.2} V  {:.3} mA  {:.1} ohm  {:.1} mW",
            result.summary.total_voltage,
            result.summary.total_current * 1000.0,
            result.summary.total_resistance,
            result.summary.total_power * 1000.0
        );

        if result.component_states.is_empty() {
            println!("  No solvable components");
        } else {
            println!("\n  Components:");
            for (id, state) in &result.component_states {
                let mut extras = String::new();
                if let Some(drop) = state.voltage_drop {
                    extras.push_str(&format!("  drop {:.2} V", drop));
                }
                if let Some(is_on) = state.is_on {
                    extras.push_str(if is_on { "  [on]" } else { "  [off]" });
                }
                println!(
                    "    {:10} {:?}  out {:.2} V  {:.3} mA{}",
                    id,
                    state.status,
                    state.output_voltage,
                    state.output_current * 1000.0,
                    extras
                );
            }
        }

        if !result.wires.is_empty() {
            println!("\n  Wires:");
            for wire in &result.wires {
                println!(
                    "    {:10} {:.2} V{}{}",
                    wire.id,
                    wire.voltage,
                    if wire.is_powered { "  powered" } else { "" },
                    if wire.is_grounded { "  grounded" } else { "" }
                );
            }
        }

        if !result.summary.errors.is_empty() {
            println!("\n  Advisories:");
            for error in &result.summary.errors {
                println!("    - {}", error);
            }
        }
    }
}

fn output_json(results: &[SolveResult], files: &[PathBuf]) {
    let output = serde_json::json!({
        "results": results.iter().zip(files).map(|(r, f)| {
            serde_json::json!({
                "file": f.display().to_string(),
                "component_states": r.component_states,
                "wires": r.wires,
                "summary": r.summary,
            })
        }).collect::<Vec<_>>(),
        "total_snapshots": results.len(),
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn handle_modules(verbose: bool) {
    let registry = ModuleRegistry::with_builtin_modules();

    println!("Built-in module definitions:\n");
    let mut definitions: Vec<_> = registry.definitions().collect();
    definitions.sort_by_key(|d| format!("{}", d.kind));

    for definition in definitions {
        println!("  {} ({} cells)", definition.name, definition.cell_count());
        if verbose {
            for (index, pin) in definition.pins.iter().enumerate() {
                println!(
                    "    [{}] {:4} {:?}  {:.1} V  {:.0} mA{}{}",
                    index,
                    pin.name,
                    pin.role,
                    pin.voltage,
                    pin.current * 1000.0,
                    if pin.is_powerable { "  powerable" } else { "" },
                    if pin.is_groundable { "  groundable" } else { "" }
                );
            }
        }
        println!();
    }
}
