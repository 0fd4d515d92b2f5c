pub mod seed;
pub mod store;
pub mod user_repo;

pub use store::Storage;
pub use user_repo::UserRepository;
