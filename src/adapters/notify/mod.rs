//! Receipt notification adapters.

mod log_notifier;

pub use log_notifier::LoggingReceiptNotifier;
