use crate::discovery::DEFAULT_SCAN_TIMEOUT_MS;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Parser)]
#[command(name = "btsweep", version)]
pub struct Opts {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    #[command(name = "daemon", alias = "d")]
    Daemon,

    #[command(flatten)]
    Command(CommandOpts),

    #[command(flatten)]
    Listen(SubscribeOpts),
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Subcommand)]
pub enum CommandOpts {
    #[command(name = "scan", alias = "s")]
    Scan {
        #[arg(long, default_value_t = DEFAULT_SCAN_TIMEOUT_MS)]
        timeout_ms: u64,

        #[arg(long, value_enum, default_value_t = Transport::All)]
        transport: Transport,
    },

    #[command(name = "stop")]
    Stop,

    #[command(name = "ping", alias = "p")]
    Ping,

    #[command(name = "kill", alias = "k")]
    Kill,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Ble,
    Classic,
    All,
}

#[derive(Debug, Subcommand)]
pub enum SubscribeOpts {
    #[command(name = "devices")]
    Devices {
        #[arg(long)]
        max_name_length: Option<u32>,
    },
}

impl Opts {
    pub fn from_env() -> Self {
        Opts::parse()
    }
}

impl Display for CommandOpts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandOpts::Scan {
                timeout_ms,
                transport,
            } => write!(f, "Scan ({transport} for {timeout_ms}ms)"),
            CommandOpts::Stop => write!(f, "Stop"),
            CommandOpts::Ping => write!(f, "Ping"),
            CommandOpts::Kill => write!(f, "Kill"),
        }
    }
}

impl Display for Transport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Ble => write!(f, "ble"),
            Transport::Classic => write!(f, "classic"),
            Transport::All => write!(f, "all"),
        }
    }
}
