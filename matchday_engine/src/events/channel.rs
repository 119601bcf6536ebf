//! Stateless pub-sub plumbing for lifecycle events.
//!
//! Components subscribe to the events the synchronization flows emit (a match finished, was
//! removed, or was moved to a new date) and react to them without any access to engine state.
//! The event is all a handler gets. Each event runs its handler as a spawned task, so a slow
//! hook never stalls the synchronization loop.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Consumes the handler and processes events until the last producer is dropped.
    pub async fn start_handler(mut self) {
        debug!("📬️ Event handler running");
        // The internal sender must go, or the recv loop would keep itself alive forever.
        drop(self.sender);
        let jobs = Arc::new(AtomicI64::new(0));
        while let Some(event) = self.listener.recv().await {
            trace!("📬️ Event received");
            let handler = Arc::clone(&self.handler);
            jobs.fetch_add(1, Ordering::SeqCst);
            let active = Arc::clone(&jobs);
            tokio::spawn(async move {
                (handler)(event).await;
                active.fetch_sub(1, Ordering::Relaxed);
                trace!("📬️ Event handled");
            });
        }
        // All producers are gone. Let in-flight handler tasks drain before returning.
        while jobs.load(Ordering::SeqCst) > 0 {
            debug!("📬️ Waiting for {} handler tasks to finish", jobs.load(Ordering::SeqCst));
            tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to publish event: {e}");
        }
    }
}
