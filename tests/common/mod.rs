#![allow(unused_imports)]

pub use fleetrun_test_utils::builders::ProcessSpecBuilder;
pub use fleetrun_test_utils::fake_actuator::{ActuatorCall, RecordingActuator};
pub use fleetrun_test_utils::{init_tracing, wait_until, with_timeout};
