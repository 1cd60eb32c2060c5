use std::fmt::Debug;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// One event as seen by the capture layer.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: Option<String>,
    pub fields: Vec<(&'static str, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    fn record_value(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name => self.fields.push((name, value)),
        }
    }
}

/// Shared view of every event logged by the test binary.
#[derive(Debug, Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    pub fn messages(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| event.message.clone())
            .collect()
    }

    pub fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.lock()
            .iter()
            .find(|event| event.message.as_deref() == Some(message))
            .cloned()
    }

    fn push(&self, event: CapturedEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CapturedEvent>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Install the capture layer as the global subscriber. Every call returns
/// the same handle; events from all tests in the binary end up in it.
pub fn capture_events() -> CapturedEvents {
    static EVENTS: OnceLock<CapturedEvents> = OnceLock::new();

    EVENTS
        .get_or_init(|| {
            let events = CapturedEvents::default();
            let subscriber = tracing_subscriber::registry().with(Capture {
                events: events.clone(),
            });
            tracing::subscriber::set_global_default(subscriber)
                .expect("no other global subscriber in the test binary");
            events
        })
        .clone()
}

struct Capture {
    events: CapturedEvents,
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut captured = CapturedEvent {
            level: *event.metadata().level(),
            message: None,
            fields: Vec::new(),
        };
        event.record(&mut captured);
        self.events.push(captured);
    }
}

impl Visit for CapturedEvent {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.record_value(field, format!("{value:?}"));
    }
}
