pub mod config;
pub mod error;
pub mod participant;
pub mod room;
pub mod routes;
pub mod state;
