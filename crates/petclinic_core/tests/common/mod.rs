#![allow(dead_code)]

use petclinic_core::{
    Pet, PetId, PetListQuery, PetRepository, RepoError, RepoResult, ENTITY_ID_FIELD,
};
use std::fmt;
use std::io;
use std::sync::{Arc, Barrier, Mutex};
use std::thread::{self, ThreadId};
use tracing::dispatcher::{self, DefaultGuard};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

pub const SERVICE_TARGET: &str = "petclinic_core::service::pet_service";
pub const FAKE_REPOSITORY_TARGET: &str = "fake_repository";

/// One event plus the fields of every span enclosing it, innermost winning.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub context: Vec<(String, String)>,
    pub thread: ThreadId,
}

impl CapturedEvent {
    pub fn entity_id(&self) -> Option<&str> {
        self.context
            .iter()
            .find(|(key, _)| key == ENTITY_ID_FIELD)
            .map(|(_, value)| value.as_str())
    }
}

struct SpanFields(Vec<(String, String)>);

struct FieldCollector<'a>(&'a mut Vec<(String, String)>);

impl Visit for FieldCollector<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        attrs.record(&mut FieldCollector(&mut fields));
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        event.record(&mut FieldCollector(&mut fields));
        let message = fields
            .iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();

        let mut context: Vec<(String, String)> = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanFields(span_fields)) = span.extensions().get::<SpanFields>() {
                    for (key, value) in span_fields {
                        context.retain(|(existing, _)| existing != key);
                        context.push((key.clone(), value.clone()));
                    }
                }
            }
        }

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            context,
            thread: thread::current().id(),
        };
        self.events
            .lock()
            .expect("capture mutex poisoned")
            .push(captured);
    }
}

/// Event sink shared by every thread that installs it.
#[derive(Clone)]
pub struct Capture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    dispatch: Dispatch,
}

impl Capture {
    pub fn new() -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(CaptureLayer {
            events: Arc::clone(&events),
        });
        Self {
            events,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Routes the current thread's events here until the guard drops.
    pub fn install(&self) -> DefaultGuard {
        dispatcher::set_default(&self.dispatch)
    }

    pub fn take(&self) -> Vec<CapturedEvent> {
        std::mem::take(&mut *self.events.lock().expect("capture mutex poisoned"))
    }

    pub fn take_target(&self, target: &str) -> Vec<CapturedEvent> {
        self.take()
            .into_iter()
            .filter(|event| event.target == target)
            .collect()
    }

    pub fn take_service(&self) -> Vec<CapturedEvent> {
        self.take_target(SERVICE_TARGET)
    }
}

pub enum FakeMode {
    Succeed,
    RefuseConnection,
    Panic,
    /// Meets the barrier twice inside `save`, then succeeds.
    Rendezvous(Arc<Barrier>),
}

/// In-memory repository; emits one `fake_repository` event per `save` so
/// tests can see which span fields were active during the call.
pub struct FakeRepository {
    mode: FakeMode,
}

impl FakeRepository {
    pub fn new(mode: FakeMode) -> Self {
        Self { mode }
    }
}

fn stored_copy(pet: &Pet) -> Pet {
    let mut saved = pet.clone();
    saved.version += 1;
    saved
}

impl PetRepository for FakeRepository {
    fn save(&self, pet: &Pet) -> RepoResult<Pet> {
        tracing::debug!(target: "fake_repository", "event=fake_save");
        match &self.mode {
            FakeMode::Succeed => Ok(stored_copy(pet)),
            FakeMode::RefuseConnection => Err(RepoError::backend(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            FakeMode::Panic => panic!("storage driver crashed"),
            FakeMode::Rendezvous(barrier) => {
                barrier.wait();
                barrier.wait();
                Ok(stored_copy(pet))
            }
        }
    }

    fn get_pet(&self, _id: PetId) -> RepoResult<Option<Pet>> {
        Ok(None)
    }

    fn find_by_identification_number(
        &self,
        _identification_number: &str,
    ) -> RepoResult<Option<Pet>> {
        Ok(None)
    }

    fn list_pets(&self, _query: &PetListQuery) -> RepoResult<Vec<Pet>> {
        Ok(Vec::new())
    }
}
