//! Core traits defined in `tablebook-core` and implemented by other crates.

pub mod clock;

pub use clock::Clock;
