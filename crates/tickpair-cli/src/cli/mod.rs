pub mod config;
pub mod stdin;
