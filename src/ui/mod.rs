pub mod app;
pub mod event_loop;
pub mod render;
pub mod theme;
