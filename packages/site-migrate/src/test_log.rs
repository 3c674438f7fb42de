//! Counts tracing events emitted while a closure runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

struct AtLeast {
    level: Level,
    seen: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for AtLeast {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // more verbose levels compare greater
        if *event.metadata().level() <= self.level {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f`, returning its result and how many events at `level` or above it logged.
pub fn count_events<T>(level: Level, f: impl FnOnce() -> T) -> (T, usize) {
    let seen = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(AtLeast {
        level,
        seen: seen.clone(),
    });
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, seen.load(Ordering::SeqCst))
}
