//! Fakes shared by the engine and orchestrator tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::AttemptError;
use super::sleeper::Sleeper;
use super::transport::{HttpResponse, PreparedRequest, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Send,
    Sleep(Duration),
}

/// Ordered record of sends and sleeps, shared between a transport and a sleeper.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

pub fn ok(body: &str) -> Result<HttpResponse, AttemptError> {
    Ok(HttpResponse {
        status: 200,
        content_type: Some("text/plain; charset=utf-8".to_string()),
        body: body.as_bytes().to_vec(),
    })
}

/// Replies from a fixed script; once the script is exhausted it keeps
/// answering "processing".
pub struct ScriptedTransport {
    log: EventLog,
    script: Mutex<VecDeque<Result<HttpResponse, AttemptError>>>,
    sent: Mutex<Vec<PreparedRequest>>,
    first_call_stall: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(log: EventLog, script: Vec<Result<HttpResponse, AttemptError>>) -> Self {
        Self {
            log,
            script: Mutex::new(script.into()),
            sent: Mutex::new(Vec::new()),
            first_call_stall: None,
        }
    }

    /// Block the first send for `stall` before replying.
    pub fn with_first_call_stall(mut self, stall: Duration) -> Self {
        self.first_call_stall = Some(stall);
        self
    }

    pub fn sent(&self) -> Vec<PreparedRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, AttemptError> {
        self.log.push(Event::Send);
        let first = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(request.clone());
            sent.len() == 1
        };
        let reply = self.script.lock().unwrap().pop_front();
        if first {
            if let Some(stall) = self.first_call_stall {
                std::thread::sleep(stall);
            }
        }
        reply.unwrap_or_else(|| ok("processing"))
    }
}

/// Panics on the first send, then answers every send with `reply`.
pub struct PanicOnceTransport {
    calls: AtomicUsize,
    reply: HttpResponse,
}

impl PanicOnceTransport {
    pub fn new(reply: Result<HttpResponse, AttemptError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: reply.expect("reply must be a response"),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for PanicOnceTransport {
    fn send(&self, _request: &PreparedRequest) -> Result<HttpResponse, AttemptError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("transfer blew up");
        }
        Ok(self.reply.clone())
    }
}

/// Records each requested delay and returns immediately.
pub struct RecordingSleeper {
    log: EventLog,
    panics: bool,
}

impl RecordingSleeper {
    pub fn new(log: EventLog) -> Self {
        Self { log, panics: false }
    }

    /// Panics instead of sleeping, taking the whole engine task down.
    pub fn that_panics(log: EventLog) -> Self {
        Self { log, panics: true }
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if self.panics {
            panic!("sleeper blew up");
        }
        self.log.push(Event::Sleep(duration));
        tokio::task::yield_now().await;
    }
}
