//! Pure domain logic for the review catalog.
//!
//! Nothing in this crate touches the database; the `yamdb-db` crate calls
//! into these validators before every write.

pub mod catalog;
pub mod display;
pub mod error;
pub mod review;
pub mod types;
