mod adapters;
mod cli;
mod logging;

use clap::Parser;

use jsonwebdb_client::error::{JwdbError, JwdbResult};

use crate::cli::Args;

fn main() -> JwdbResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| JwdbError::Internal(e.to_string()))?;
    rt.block_on(adapters::bridge::run(args))
}
