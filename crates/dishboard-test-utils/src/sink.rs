use dishboard_protocol::{DishEvent, EventSink};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<DishEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DishEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DishEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: DishEvent) {
        self.events.lock().push(event);
    }
}
