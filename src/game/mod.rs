pub mod field;
pub mod logic;
pub mod session;
pub mod types;
