// Fri Oct 16 2026 - Alex

pub mod logging;
pub mod parallel;
#[cfg(test)]
pub mod testing;

pub use logging::{LoggingUtils, ScopedTimer};
pub use parallel::BatchExecutor;
