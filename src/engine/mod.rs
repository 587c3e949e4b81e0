//! Engine environment: a dedicated worker thread owning the page.
//!
//! The environment exposes the engine's two primitives, asynchronous script
//! evaluation and one-way message pushes, and nothing else. Evaluation
//! requests queue on a command channel and are processed strictly in order by
//! a single-threaded runtime, so no locks guard page state. The environment
//! is explicitly owned and reference counted, with defined startup and
//! teardown.

pub mod commands;
pub mod document;
pub mod identity;
pub mod ops;
pub mod ranges;

use std::sync::mpsc::SyncSender;
use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::error::BridgeError;
use crate::protocol::PushPayload;

use ops::PageEngine;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    initial_html: String,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            initial_html: "<html><head></head><body></body></html>".to_string(),
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.initial_html = html.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub enum EngineCommand {
    Evaluate {
        script: String,
        respond_to: SyncSender<Result<String, String>>,
    },
    Shutdown,
}

pub struct EngineEnvironment {
    command_tx: UnboundedSender<EngineCommand>,
    events_rx: Mutex<Option<UnboundedReceiver<PushPayload>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl EngineEnvironment {
    /// Spawn the engine worker and return a shared handle to it.
    pub fn start(config: EngineConfig) -> Arc<Self> {
        let (command_tx, mut command_rx) = unbounded_channel::<EngineCommand>();
        let (events_tx, events_rx) = unbounded_channel::<PushPayload>();

        let worker = thread::Builder::new()
            .name("tether-engine".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("engine worker runtime");
                runtime.block_on(async move {
                    let mut page = PageEngine::new(&config.initial_html, events_tx);
                    while let Some(command) = command_rx.recv().await {
                        match command {
                            EngineCommand::Evaluate { script, respond_to } => {
                                let reply = page.evaluate(&script).await;
                                // The receiver may have abandoned the call;
                                // a failed send just discards the late reply.
                                let _ = respond_to.send(reply);
                            }
                            EngineCommand::Shutdown => break,
                        }
                    }
                    debug!(target = "engine", "worker loop exited");
                });
            })
            .expect("spawn engine worker");

        Arc::new(Self {
            command_tx,
            events_rx: Mutex::new(Some(events_rx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Queue one asynchronous evaluation. The reply arrives on `respond_to`
    /// once the worker reaches the request; this call never blocks.
    pub fn evaluate(
        &self,
        script: String,
        respond_to: SyncSender<Result<String, String>>,
    ) -> Result<(), BridgeError> {
        self.command_tx
            .send(EngineCommand::Evaluate { script, respond_to })
            .map_err(|_| BridgeError::Disconnected)
    }

    /// Take the push-message receiver. The first caller owns delivery;
    /// subsequent calls return `None`.
    pub fn take_events(&self) -> Option<UnboundedReceiver<PushPayload>> {
        self.events_rx.lock().unwrap().take()
    }

    /// Stop the worker after it drains already-queued requests, and join it.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(EngineCommand::Shutdown);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}
