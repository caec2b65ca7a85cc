/// Binding generator entry point
use anyhow::Result;
use clap::Command;

use bindgen_evm::codegen::cli::{build_codegen_command, handle_codegen_command};

fn build_cli() -> Command {
    Command::new("abi-bindgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate typed contract bindings from EVM ABI files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_codegen_command())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("codegen", sub_matches)) => {
            handle_codegen_command(sub_matches).await?;
        }
        _ => unreachable!("clap requires a subcommand"),
    }

    Ok(())
}
