//! Bevy integration for the chess client
//!
//! Wraps [`GameController`] in resources and runs its requests on the
//! [`AsyncComputeTaskPool`], one at a time, so a slow engine service never
//! blocks a frame.
//!
//! # Data Flow
//!
//! - [`ChessInput`] messages are applied to the controller
//! - the in-flight request task is polled with `futures_lite::future::poll_once`
//!   and its reply fed back
//! - the next queued request is spawned
//! - [`ChessSnapshot`] is refreshed and [`ChessUiEvent`]s are written
//!
//! Starting over (reset or a new game) drops the in-flight task, which
//! cancels it, and discards queued requests.
//!
//! # Plugin Dependencies
//!
//! Needs the task pools from [`bevy::MinimalPlugins`] or `DefaultPlugins`.

use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use engine_service::{ChessService, Reply, Request, ServiceResult};
use futures_lite::future;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

use crate::game::controller::GameController;
use crate::game::events::{Input, UiEvent};
use crate::game::mode::{DEFAULT_QUIZ_HINTS, DEFAULT_QUIZ_ROUNDS};
use crate::game::snapshot::UiSnapshot;

/// Player input for the controller
#[derive(Message, Debug, Clone)]
pub struct ChessInput(pub Input);

/// One-shot notification raised by the controller
#[derive(Message, Debug, Clone)]
pub struct ChessUiEvent(pub UiEvent);

/// Latest snapshot; only written when it actually changed
#[derive(Resource, Debug, Clone)]
pub struct ChessSnapshot(pub UiSnapshot);

#[derive(Resource)]
pub struct ChessClient {
    controller: GameController,
}

impl ChessClient {
    pub fn controller(&self) -> &GameController {
        &self.controller
    }
}

#[derive(Resource, Clone)]
pub struct ChessServiceHandle(pub Arc<dyn ChessService>);

type Completed = (Request, ServiceResult<Reply>);

/// Queued requests and the one being executed
#[derive(Resource, Default)]
pub struct RequestPipeline {
    queue: VecDeque<Request>,
    in_flight: Option<Task<Completed>>,
}

impl RequestPipeline {
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_none()
    }

    fn cancel(&mut self) {
        if self.in_flight.take().is_some() || !self.queue.is_empty() {
            info!(
                "[SERVICE] Cancelling outstanding requests ({} queued)",
                self.queue.len()
            );
        }
        self.queue.clear();
    }
}

/// Execution order within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum ChessClientSystems {
    Input,
    Network,
    Publish,
}

pub struct ChessClientPlugin {
    service: Arc<dyn ChessService>,
    quiz_rounds: u32,
    quiz_hints: u32,
}

impl ChessClientPlugin {
    pub fn new(service: Arc<dyn ChessService>) -> Self {
        Self {
            service,
            quiz_rounds: DEFAULT_QUIZ_ROUNDS,
            quiz_hints: DEFAULT_QUIZ_HINTS,
        }
    }

    pub fn with_quiz_budget(mut self, rounds: u32, hints: u32) -> Self {
        self.quiz_rounds = rounds;
        self.quiz_hints = hints;
        self
    }
}

impl Plugin for ChessClientPlugin {
    fn build(&self, app: &mut App) {
        let controller = GameController::with_quiz_budget(self.quiz_rounds, self.quiz_hints);
        let snapshot = ChessSnapshot(controller.snapshot().clone());

        app.add_message::<ChessInput>()
            .add_message::<ChessUiEvent>()
            .insert_resource(ChessServiceHandle(Arc::clone(&self.service)))
            .insert_resource(ChessClient { controller })
            .insert_resource(snapshot)
            .init_resource::<RequestPipeline>();

        app.configure_sets(
            Update,
            (
                ChessClientSystems::Input,
                ChessClientSystems::Network,
                ChessClientSystems::Publish,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                apply_inputs.in_set(ChessClientSystems::Input),
                (poll_request, dispatch_request)
                    .chain()
                    .in_set(ChessClientSystems::Network),
                publish_snapshot.in_set(ChessClientSystems::Publish),
            ),
        );
    }
}

fn apply_inputs(
    mut inputs: MessageReader<ChessInput>,
    mut client: ResMut<ChessClient>,
    mut pipeline: ResMut<RequestPipeline>,
) {
    for ChessInput(input) in inputs.read() {
        if input.starts_over() {
            pipeline.cancel();
        }
        let requests = client.controller.handle(input.clone());
        pipeline.queue.extend(requests);
    }
}

fn poll_request(mut client: ResMut<ChessClient>, mut pipeline: ResMut<RequestPipeline>) {
    let Some(task) = pipeline.in_flight.as_mut() else {
        return;
    };
    let Some((request, result)) = future::block_on(future::poll_once(task)) else {
        return;
    };
    pipeline.in_flight = None;
    let follow_up = client.controller.on_reply(request, result);
    pipeline.queue.extend(follow_up);
}

fn dispatch_request(service: Res<ChessServiceHandle>, mut pipeline: ResMut<RequestPipeline>) {
    if pipeline.in_flight.is_some() {
        return;
    }
    let Some(request) = pipeline.queue.pop_front() else {
        return;
    };
    debug!("[SERVICE] Dispatching {}", request.name());

    let service = Arc::clone(&service.0);
    let task = AsyncComputeTaskPool::get().spawn(async move {
        let result = service.execute(&request);
        (request, result)
    });
    pipeline.in_flight = Some(task);
}

fn publish_snapshot(
    mut client: ResMut<ChessClient>,
    mut snapshot: ResMut<ChessSnapshot>,
    mut events: MessageWriter<ChessUiEvent>,
) {
    for event in client.controller.take_events() {
        events.write(ChessUiEvent(event));
    }
    if client.controller.snapshot() != &snapshot.0 {
        snapshot.0 = client.controller.snapshot().clone();
    }
}
