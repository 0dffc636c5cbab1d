use clap::{Parser, Subcommand};
use katagami::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Validate workspace documents, instantiate blueprints and check flow constraints
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate every entity and cross-reference of a workspace document
    Validate {
        /// Path to the workspace JSON file
        workspace_path: String,
    },
    /// Instantiate a blueprint into a setup with one flow per template use
    Instantiate {
        /// Path to the workspace JSON file
        workspace_path: String,
        /// Id of the blueprint to instantiate
        blueprint_id: String,
        /// Id of the script the new setup belongs to
        #[arg(short, long)]
        script: String,
        /// Write the resulting setup and flows here instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Run configuration constraints over an exported flow document
    CheckFlow {
        /// Path to the flow JSON file
        flow_path: String,
        /// Optional engine configuration JSON file
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Validate { workspace_path } => run_validate(&workspace_path),
        Command::Instantiate {
            workspace_path,
            blueprint_id,
            script,
            out,
        } => run_instantiate(&workspace_path, &blueprint_id, &script, out.as_deref()),
        Command::CheckFlow { flow_path, config } => run_check_flow(&flow_path, config.as_deref()),
    }
}

fn run_validate(workspace_path: &str) {
    let document = WorkspaceDocument::from_file(workspace_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workspace: {}", e)));

    let validation = document.validate();
    println!(
        "{} templates, {} groups, {} sections, {} blueprints, {} scripts, {} setups, {} flows",
        document.templates.len(),
        document.groups.len(),
        document.sections.len(),
        document.blueprints.len(),
        document.scripts.len(),
        document.setups.len(),
        document.flows.len()
    );
    report(&validation);
}

fn run_instantiate(workspace_path: &str, blueprint_id: &str, script_id: &str, out: Option<&str>) {
    let start = Instant::now();
    let (catalog, _workspace) = WorkspaceDocument::from_file(workspace_path)
        .and_then(WorkspaceDocument::into_stores)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workspace: {}", e)));

    let instantiation = Instantiator::new(&catalog)
        .instantiate_by_id(blueprint_id, script_id)
        .unwrap_or_else(|e| exit_with_error(&format!("Instantiation failed: {}", e)));
    let json = serde_json::to_string_pretty(&instantiation)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialise result: {}", e)));

    match out {
        Some(path) => {
            fs::write(path, json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path, e))
            });
            eprintln!(
                "Setup '{}' with {} flows written to {} in {:?}",
                instantiation.setup.id,
                instantiation.flows.len(),
                path,
                start.elapsed()
            );
        }
        None => println!("{}", json),
    }
}

fn run_check_flow(flow_path: &str, config_path: Option<&str>) {
    let config = match config_path {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };
    let document = FlowDocument::from_file(flow_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flow: {}", e)));

    let structure = document.validate();
    if !structure.valid {
        report(&structure);
    }

    let engine = ConstraintEngine::new(config.constraints);
    if let Some(profile) = engine.shared_integration(&document.graph) {
        println!(
            "Integration: {} ({})",
            profile.integration_type,
            profile.sub_kind.as_deref().unwrap_or("no sub-kind")
        );
    }
    report(&engine.validate(&document.graph));
}

fn report(validation: &Validation) {
    if validation.valid {
        println!("OK");
        return;
    }
    println!("{} problem(s):", validation.errors.len());
    for error in &validation.errors {
        println!("  - {}", error);
    }
    std::process::exit(1);
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
