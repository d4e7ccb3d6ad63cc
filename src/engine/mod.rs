pub mod aggregate;
pub mod settle;
pub mod summary;
