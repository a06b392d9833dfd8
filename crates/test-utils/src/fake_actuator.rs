use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use fleetrun::exec::ProcessActuator;

/// What a coordinator asked its actuator to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorCall {
    Start,
    Stop(String),
}

/// A fake actuator that records start/stop calls instead of spawning
/// processes.
#[derive(Clone, Default)]
pub struct RecordingActuator {
    calls: Arc<Mutex<Vec<ActuatorCall>>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn starts(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Start))
            .count()
    }
}

impl ProcessActuator for RecordingActuator {
    fn start(&mut self) {
        self.calls.lock().unwrap().push(ActuatorCall::Start);
    }

    fn stop<'a>(&'a mut self, reason: &str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let reason = reason.to_string();
        let calls = Arc::clone(&self.calls);
        Box::pin(async move {
            calls.lock().unwrap().push(ActuatorCall::Stop(reason));
        })
    }
}
