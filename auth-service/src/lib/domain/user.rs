pub mod errors;
pub mod models;
pub mod password_policy;
pub mod ports;
pub mod service;
