//! Domain model structs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row. Write DTOs come from `bookshelf_core::form`.

pub mod book;
