//! Synchronous driver: runs every request to completion before returning
//!
//! Used by the command line and by tests. Each request blocks for at most the
//! service's per-request timeout; requests raised by a reply run after the
//! ones already queued, in order. Nothing is outstanding between calls, so
//! a reset has nothing to cancel.

use engine_service::{ChessService, Request};
use std::collections::VecDeque;
use tracing::debug;

use crate::game::controller::GameController;
use crate::game::events::{Input, UiEvent};
use crate::game::snapshot::UiSnapshot;

pub struct Session<S> {
    controller: GameController,
    service: S,
    queue: VecDeque<Request>,
}

impl<S: ChessService> Session<S> {
    pub fn new(controller: GameController, service: S) -> Self {
        Self {
            controller,
            service,
            queue: VecDeque::new(),
        }
    }

    /// Apply `input` and run the resulting requests
    pub fn dispatch(&mut self, input: Input) -> &UiSnapshot {
        let requests = self.controller.handle(input);
        self.queue.extend(requests);
        self.drain();
        self.controller.snapshot()
    }

    fn drain(&mut self) {
        while let Some(request) = self.queue.pop_front() {
            debug!("[SESSION] Running {}", request.name());
            let result = self.service.execute(&request);
            let follow_up = self.controller.on_reply(request, result);
            self.queue.extend(follow_up);
        }
    }

    pub fn snapshot(&self) -> &UiSnapshot {
        self.controller.snapshot()
    }

    pub fn take_events(&mut self) -> Vec<UiEvent> {
        self.controller.take_events()
    }

    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}
