pub mod activities;
pub mod calendar;
pub mod header;
pub mod stats;
pub mod statusbar;
