pub mod auth_gate;
pub mod health_service;
