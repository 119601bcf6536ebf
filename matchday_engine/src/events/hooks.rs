use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    MatchFinishedEvent,
    MatchRemovedEvent,
    MatchRescheduledEvent,
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub match_finished_producer: Vec<EventProducer<MatchFinishedEvent>>,
    pub match_removed_producer: Vec<EventProducer<MatchRemovedEvent>>,
    pub match_rescheduled_producer: Vec<EventProducer<MatchRescheduledEvent>>,
}

pub struct EventHandlers {
    pub on_match_finished: Option<EventHandler<MatchFinishedEvent>>,
    pub on_match_removed: Option<EventHandler<MatchRemovedEvent>>,
    pub on_match_rescheduled: Option<EventHandler<MatchRescheduledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_match_finished = hooks.on_match_finished.map(|f| EventHandler::new(buffer_size, f));
        let on_match_removed = hooks.on_match_removed.map(|f| EventHandler::new(buffer_size, f));
        let on_match_rescheduled = hooks.on_match_rescheduled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_match_finished, on_match_removed, on_match_rescheduled }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_match_finished {
            result.match_finished_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_match_removed {
            result.match_removed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_match_rescheduled {
            result.match_rescheduled_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_match_finished {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_match_removed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_match_rescheduled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_match_finished: Option<Handler<MatchFinishedEvent>>,
    pub on_match_removed: Option<Handler<MatchRemovedEvent>>,
    pub on_match_rescheduled: Option<Handler<MatchRescheduledEvent>>,
}

impl EventHooks {
    pub fn on_match_finished<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MatchFinishedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_match_finished = Some(Arc::new(f));
        self
    }

    pub fn on_match_removed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MatchRemovedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_match_removed = Some(Arc::new(f));
        self
    }

    pub fn on_match_rescheduled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MatchRescheduledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_match_rescheduled = Some(Arc::new(f));
        self
    }
}
