//! Command implementations for the road camera labeler CLI
//!
//! Each command lives in its own module:
//! - `label`: run the pipeline and write the image and sensor tables
//! - `proximity`: write the station proximity report

pub mod label;
pub mod proximity;
pub mod shared;

use crate::cli::args::{Args, Commands};

/// Dispatch to the subcommand handler; `None` when no subcommand was given
pub async fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Some(Commands::Label(label_args)) => label::run_label(label_args).await,
        Some(Commands::Proximity(proximity_args)) => {
            proximity::run_proximity(proximity_args).await
        }
        None => Ok(()),
    }
}
