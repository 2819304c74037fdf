pub mod aggregator;
pub mod radio;
pub mod scanner;
pub mod source;
pub mod types;

pub use scanner::start_scan;
pub use scanner::stop_scan;

use aggregator::Aggregator;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 10_000;

pub static AGGREGATOR: Lazy<Arc<Mutex<Aggregator>>> =
    Lazy::new(|| Arc::new(Mutex::new(Aggregator::new())));
