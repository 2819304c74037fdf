use crate::error::{BtsweepError, BtsweepResult};

use humantime::format_rfc3339_seconds;
use std::{process, time::SystemTime};

#[derive(Clone, PartialEq)]
pub enum LoggerType {
    Server,
    Client,
    Command,
}

pub fn init_logger(log_type: LoggerType, filter: log::LevelFilter) -> BtsweepResult<()> {
    let process_info = if LoggerType::Client == log_type {
        format!("({}) ", process::id())
    } else {
        String::new()
    };

    let btsweep_logger = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}{} [{}] {} - {}",
                process_info,
                format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(filter);

    match log_type {
        LoggerType::Server => btsweep_logger.chain(fern::log_file("/tmp/btsweep-server.log")?),
        LoggerType::Client => btsweep_logger.chain(fern::log_file("/tmp/btsweep-client.log")?),
        LoggerType::Command => btsweep_logger.chain(std::io::stdout()),
    }
    .apply()
    .map_err(|_| BtsweepError::LoggerError)
}
