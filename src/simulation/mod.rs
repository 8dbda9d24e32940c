pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod context;
pub mod error_estimator;
pub mod controller;
pub mod integrator;
pub mod scenario;
