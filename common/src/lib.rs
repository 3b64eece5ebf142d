pub mod config;
pub mod frame;
pub mod naming;
pub mod texture;
