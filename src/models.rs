pub mod audit;
pub mod auth;
pub mod base;
pub mod candidatures;
pub mod catalog;
pub mod documents;
pub mod finance;
pub mod locations;
pub mod notifications;
pub mod rbac;
pub mod scales;

pub use base::{BaseFields, Entity};
