// Core modules: settings, origins, caught failures, resolution, rendering, errors.
pub mod caught;
pub mod config;
pub mod error;
pub mod origin;
pub mod render;
pub mod resolve;
