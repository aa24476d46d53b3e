pub mod app;
pub mod board;
pub mod dialogs;
pub mod rendering;
pub mod resources;
