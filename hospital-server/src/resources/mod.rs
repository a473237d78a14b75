//! Resource model - table descriptors and the generic CRUD repository

pub mod crud;
pub mod descriptor;
pub mod entities;

pub use crud::{table_counts, CrudRepo, Record};
pub use descriptor::{Column, EntityDescriptor};
