//! # tablebook-database
//!
//! PostgreSQL connection management, migrations, repositories, and the
//! reservation store abstraction with its PostgreSQL and in-memory
//! implementations.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{
    MemoryReservationStore, MemoryUserDirectory, PgReservationStore, ReservationStore,
    ReservationTx, UserDirectory,
};
