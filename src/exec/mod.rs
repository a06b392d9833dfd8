// src/exec/mod.rs

//! Process execution: the actuator seam and the real child-process engine.

pub mod actuator;
pub mod executor;

pub use actuator::ProcessActuator;
pub use executor::ProcessExecutor;
