pub mod config;
pub mod constants;
pub mod convergence;
pub mod engine;
pub mod impact;
pub mod neorisk_errors;
pub mod observation;
pub mod records;
pub mod result;
pub mod runner;
pub mod sampler;
pub mod statistics;
pub mod uncertainty;

pub use config::{SimulationConfig, SimulationConfigBuilder};
pub use engine::{object_seed, BatchOutcome, ImpactEngine};
pub use neorisk_errors::NeoRiskError;
pub use observation::ObjectObservation;
pub use result::{RiskLevel, SimulationResult};
pub use uncertainty::{SigmaScale, UncertaintyProfile};
