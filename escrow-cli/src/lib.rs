pub mod commands;
pub mod config;
pub mod error;
pub mod helper;
pub mod rpc;
