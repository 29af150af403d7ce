pub mod app;
pub mod blit;
pub mod capture;
pub mod config_watch;
pub mod events;
pub mod frame_clock;
pub mod present;
pub mod storage;
pub mod theme_watch;
