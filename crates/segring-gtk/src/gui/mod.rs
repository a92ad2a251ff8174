pub mod app;
pub mod ring;
pub mod theme;
