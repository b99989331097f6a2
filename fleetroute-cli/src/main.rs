//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() -> eyre::Result<()> {
    env_logger::init();
    fleetroute_cli::run()?;
    Ok(())
}
