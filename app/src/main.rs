mod application;
mod discovery;
mod error;
mod global;
mod ipc;
mod logger;
mod opts;

use crate::{error::BtsweepResult, logger::*};

use opts::{Action, Opts};

#[tokio::main]
async fn main() -> BtsweepResult<()> {
    let opts = Opts::from_env();
    run(&opts).await?;

    Ok(())
}

async fn run(opts: &Opts) -> BtsweepResult<()> {
    let level_filter = if opts.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    match &opts.action {
        Action::Daemon => {
            init_logger(LoggerType::Server, level_filter)?;
            application::server::start_server().await?;
        }
        Action::Command(command) => {
            init_logger(LoggerType::Command, level_filter)?;
            application::standalone::send_command(command.clone()).await?;
        }
        Action::Listen(subscription) => {
            init_logger(LoggerType::Client, level_filter)?;
            application::client::start_client(subscription).await?;
        }
    };

    Ok(())
}
