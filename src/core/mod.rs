pub mod balance;
pub mod expense;
pub mod money;
pub mod participant;
pub mod settlement;
