pub mod applications;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod storage;
pub mod telemetry;
