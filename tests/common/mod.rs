#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use failaware::{Transport, TransportError};
use http::{Request, Response, StatusCode};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Outcome a [`ScriptedTransport`] produces for one call.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Status(u16),
    Refused,
}

/// Transport that plays a script of outcomes, repeating the final step forever.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Step>,
    bodies: Mutex<Vec<Bytes>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        let script: VecDeque<Step> = script.into_iter().collect();
        let first = *script.front().expect("script must not be empty");
        Self {
            script: Mutex::new(script),
            last: Mutex::new(first),
            bodies: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::new([step])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Bytes> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: Request<Bytes>,
        _timeout: Duration,
    ) -> Result<Response<Bytes>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(request.into_body());
        let step = {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *last = next;
            }
            *last
        };
        match step {
            Step::Status(code) => {
                let mut rsp = Response::new(Bytes::new());
                *rsp.status_mut() = StatusCode::from_u16(code).unwrap();
                Ok(rsp)
            }
            Step::Refused => Err(TransportError::Connect("connection refused".into())),
        }
    }
}
