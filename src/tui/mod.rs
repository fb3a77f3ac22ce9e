pub mod app;
pub mod events;
pub mod state;
pub mod theme;
pub mod widgets;
