use clap::Parser;
use roadcam_labeler::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(commands::run(args)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Road Camera Labeler - road and weather conditions for roadside camera images");
    println!("============================================================================");
    println!();
    println!("Reconciles redundant road weather sensors into one road and one weather");
    println!("condition per site and labels every camera image near that site.");
    println!();
    println!("USAGE:");
    println!("    roadcam-labeler <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    label       Label camera images from a snapshot (main command)");
    println!("    proximity   Report camera and weather stations within a radius");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Label a snapshot and write Parquet tables:");
    println!("    roadcam-labeler label --input ./snapshot --output ./dataset");
    println!();
    println!("    # Write CSV instead, with a custom configuration:");
    println!("    roadcam-labeler label -i ./snapshot -o ./dataset --format csv --config labeler.toml");
    println!();
    println!("    # Station proximity within 150 m:");
    println!("    roadcam-labeler proximity -i ./snapshot --radius 150");
    println!();
    println!("For detailed help on any command, use:");
    println!("    roadcam-labeler <COMMAND> --help");
}
