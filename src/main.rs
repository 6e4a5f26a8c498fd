#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use std::process::ExitCode;

mod cli;
mod config;
mod constants;
mod ctx;
mod errors;
mod git;
mod host;
mod output;
mod store;
mod subcommands;
mod submit;
mod sync;
mod tree;
mod validate;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match cli::Cli::try_parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    let result = match cli.init_tracing_subscriber() {
        Ok(cli) => cli.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            output::error(&e);
            if !e.is_recoverable() {
                output::detail("Re-run with `-vvv` for diagnostics.");
            }
            ExitCode::FAILURE
        }
    }
}
