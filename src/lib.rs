pub mod commands;
pub mod explain;
pub mod http;
pub mod market;
pub mod portfolio;
pub mod runtime;
pub mod server;
