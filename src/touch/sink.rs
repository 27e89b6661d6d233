use super::config::DISPATCH_EVENT_CAPACITY;
use super::types::InputEvent;

/// Downstream consumer of normalized input events.
pub trait EventSink {
    fn emit(&mut self, event: InputEvent);
}

impl<F> EventSink for F
where
    F: FnMut(InputEvent),
{
    fn emit(&mut self, event: InputEvent) {
        self(event)
    }
}

#[cfg(test)]
impl EventSink for std::vec::Vec<InputEvent> {
    fn emit(&mut self, event: InputEvent) {
        self.push(event);
    }
}

/// Fixed-capacity event queue. Events past capacity are dropped and counted.
#[derive(Clone, Debug, Default)]
pub struct EventBuffer<const N: usize = DISPATCH_EVENT_CAPACITY> {
    events: heapless::Vec<InputEvent, N>,
    dropped: u16,
}

impl<const N: usize> EventBuffer<N> {
    pub fn new() -> Self {
        Self {
            events: heapless::Vec::new(),
            dropped: 0,
        }
    }

    pub fn as_slice(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn dropped(&self) -> u16 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    /// Forwards buffered events in order and empties the buffer.
    pub fn drain_into<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        for event in self.events.iter().copied() {
            sink.emit(event);
        }
        self.clear();
    }
}

impl<const N: usize> EventSink for EventBuffer<N> {
    fn emit(&mut self, event: InputEvent) {
        if self.events.push(event).is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }
}
