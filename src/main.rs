pub mod shape;
pub mod hash;
pub mod error;
pub mod infer;
pub mod optimize;
pub mod naming;
pub mod codegen;
pub mod cli;
pub mod jq_exec;
pub mod path_de;

use colored::Colorize;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(err) = command_line_interface.run() {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
