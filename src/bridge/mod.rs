//! Synchronous executor over the engine's asynchronous evaluation primitive.
//!
//! One call at a time: an `execute` while another call is pending is
//! rejected, never interleaved. The calling thread blocks on a per-call
//! rendezvous channel until the worker replies or the configured deadline
//! expires. An expired call is abandoned, not cancelled: the worker still
//! finishes it, and the late reply is discarded when it arrives.

use std::sync::mpsc::{sync_channel, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error};

use crate::engine::EngineEnvironment;
use crate::error::BridgeError;
use crate::protocol::{PushPayload, ScriptRequest};
use crate::snapshot::{ContentSnapshot, SnapshotCache};

/// Executor configuration. The default bounds every call at 30 seconds;
/// `without_deadline` restores an unbounded wait.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    deadline: Option<Duration>,
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self {
            deadline: Some(Duration::from_secs(30)),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn without_deadline(mut self) -> Self {
        self.deadline = None;
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The single in-flight invocation.
#[derive(Debug)]
struct PendingCall {
    script: String,
}

pub struct SyncExecutor {
    engine: Arc<EngineEnvironment>,
    pending: Mutex<Option<PendingCall>>,
    deadline: Option<Duration>,
}

impl SyncExecutor {
    pub fn new(engine: Arc<EngineEnvironment>, config: ExecutorConfig) -> Self {
        Self {
            engine,
            pending: Mutex::new(None),
            deadline: config.deadline,
        }
    }

    /// Evaluate a script and block until the result (or fault) arrives.
    /// The returned string is the engine's JSON-encoded value.
    pub fn execute(&self, script: &str) -> Result<String, BridgeError> {
        {
            let mut slot = self.pending.lock().unwrap();
            if let Some(call) = slot.as_ref() {
                debug!(
                    target = "bridge",
                    pending = %call.script,
                    "rejecting call while another is in flight"
                );
                return Err(BridgeError::CallInFlight);
            }
            *slot = Some(PendingCall {
                script: script.to_string(),
            });
        }
        let _reset = PendingReset(&self.pending);

        let (respond_to, reply_rx) = sync_channel(1);
        self.engine.evaluate(script.to_string(), respond_to)?;

        let reply = match self.deadline {
            Some(limit) => match reply_rx.recv_timeout(limit) {
                Ok(reply) => reply,
                Err(RecvTimeoutError::Timeout) => {
                    error!(
                        target = "bridge",
                        deadline_ms = limit.as_millis() as u64,
                        "pending call abandoned after deadline"
                    );
                    return Err(BridgeError::Timeout(limit));
                }
                Err(RecvTimeoutError::Disconnected) => return Err(BridgeError::Disconnected),
            },
            None => reply_rx.recv().map_err(|_| BridgeError::Disconnected)?,
        };

        match reply {
            Ok(result) => Ok(result),
            Err(message) => Err(BridgeError::ScriptFault(message)),
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

/// Returns the executor to idle whichever way `execute` exits.
struct PendingReset<'a>(&'a Mutex<Option<PendingCall>>);

impl Drop for PendingReset<'_> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = None;
        }
    }
}

/// Executor plus the host end of the push channel.
///
/// Pushed payloads queue while a call is pending and are flushed into the
/// snapshot cache right after the call completes, preserving read-after-write
/// ordering as the host observes it.
pub struct Bridge {
    executor: SyncExecutor,
    events: Mutex<Option<UnboundedReceiver<PushPayload>>>,
    cache: Mutex<SnapshotCache>,
}

impl Bridge {
    pub fn new(engine: Arc<EngineEnvironment>, config: ExecutorConfig) -> Self {
        let events = engine.take_events();
        Self {
            executor: SyncExecutor::new(engine, config),
            events: Mutex::new(events),
            cache: Mutex::new(SnapshotCache::new()),
        }
    }

    pub fn executor(&self) -> &SyncExecutor {
        &self.executor
    }

    /// Issue one operation and decode the JSON reply.
    pub fn call(&self, request: &ScriptRequest) -> Result<Value, BridgeError> {
        let script = serde_json::to_string(request).expect("serialize script request");
        let raw = self.executor.execute(&script);
        self.pump_events();
        let raw = raw?;
        serde_json::from_str(&raw).map_err(|err| BridgeError::MalformedReply(err.to_string()))
    }

    /// String reply; null means the target no longer resolves.
    pub fn call_string(&self, request: &ScriptRequest) -> Result<Option<String>, BridgeError> {
        match self.call(request)? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            other => Err(BridgeError::MalformedReply(format!(
                "expected string reply, got {other}"
            ))),
        }
    }

    /// Boolean reply; null decays to false.
    pub fn call_bool(&self, request: &ScriptRequest) -> Result<bool, BridgeError> {
        match self.call(request)? {
            Value::Null => Ok(false),
            Value::Bool(value) => Ok(value),
            other => Err(BridgeError::MalformedReply(format!(
                "expected boolean reply, got {other}"
            ))),
        }
    }

    /// Integer reply; null decays to zero.
    pub fn call_i64(&self, request: &ScriptRequest) -> Result<i64, BridgeError> {
        match self.call(request)? {
            Value::Null => Ok(0),
            Value::Number(value) => value.as_i64().ok_or_else(|| {
                BridgeError::MalformedReply("non-integral numeric reply".to_string())
            }),
            other => Err(BridgeError::MalformedReply(format!(
                "expected numeric reply, got {other}"
            ))),
        }
    }

    /// Fire-and-forget operation; the reply value is discarded.
    pub fn call_unit(&self, request: &ScriptRequest) -> Result<(), BridgeError> {
        self.call(request).map(|_| ())
    }

    /// Handle-list reply; null decays to an empty list.
    pub fn call_list(&self, request: &ScriptRequest) -> Result<Vec<String>, BridgeError> {
        match self.call(request)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(handle) => Ok(handle),
                    other => Err(BridgeError::MalformedReply(format!(
                        "expected handle in list, got {other}"
                    ))),
                })
                .collect(),
            other => Err(BridgeError::MalformedReply(format!(
                "expected list reply, got {other}"
            ))),
        }
    }

    /// Structured reply decoded into `T`; `None` when the target is stale.
    pub fn call_decoded<T: DeserializeOwned>(
        &self,
        request: &ScriptRequest,
    ) -> Result<Option<T>, BridgeError> {
        match self.call(request)? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| BridgeError::MalformedReply(err.to_string())),
        }
    }

    /// Latest pushed state. Never blocks on the executor.
    pub fn snapshot(&self) -> ContentSnapshot {
        self.pump_events();
        self.cache.lock().unwrap().snapshot()
    }

    fn pump_events(&self) {
        let mut cache = self.cache.lock().unwrap();
        if let Some(events) = self.events.lock().unwrap().as_mut() {
            while let Ok(payload) = events.try_recv() {
                cache.apply(payload);
            }
        }
    }
}
