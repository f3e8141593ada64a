pub mod metrics;
mod observer;

pub use metrics::SimulationMetrics;
