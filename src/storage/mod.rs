//! SQLite storage for listable resources
//!
//! Provides the listing pipeline shared by races and sports: filter
//! composition, row mapping with read-time status, one-time seeding and the
//! generic repository that ties them together.

pub mod init;
pub mod mapper;
pub mod query;
pub mod repository;
pub mod resource;
pub mod schema;
pub mod seed;

pub use repository::Repository;
pub use resource::Resource;
