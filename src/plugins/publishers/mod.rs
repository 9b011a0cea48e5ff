// Publisher implementations
pub mod log;
pub mod twitter;

pub use log::LogPublisher;
pub use twitter::TwitterPublisher;
