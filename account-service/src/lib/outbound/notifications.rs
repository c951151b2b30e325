pub mod log;

pub use log::LogCredentialNotifier;
