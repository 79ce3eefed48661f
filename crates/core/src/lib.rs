//! Domain types and rules shared by the Bookshelf crates.
//!
//! Nothing here touches the database or HTTP; the `db` and `api` crates
//! build on these types.

pub mod admin;
pub mod error;
pub mod form;
pub mod types;
