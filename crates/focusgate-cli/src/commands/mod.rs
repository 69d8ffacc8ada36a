pub mod config;
pub mod evaluate;
pub mod skip;
pub mod state;
pub mod windows;
