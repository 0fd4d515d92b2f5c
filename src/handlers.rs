pub mod audit;
pub mod auth;
pub mod candidatures;
pub mod catalog;
pub mod dashboard;
pub mod documents;
pub mod locations;
pub mod notifications;
pub mod payments;
pub mod ratings;
pub mod rbac;
pub mod scales;
pub mod users;
