//! Notifications emitted by the panel
//!
//! Consumers (a renderer, a data-transfer component) each subscribe and get
//! their own crossbeam channel carrying every event.

use crossbeam_channel::{Receiver, Sender};

/// Events kept for the first subscriber when nobody is listening yet
const BACKLOG_LIMIT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// Opening `port` failed; the handle stays closed
    PortOpenFailed { port: String, reason: String },
    /// The handle moved between closed (`false`) and open (`true`)
    PortOpenStateChanged(bool),
    /// A live handle on `port` is available through `PortPanel::connection_mut`
    PortOpened { port: String },
}

/// Fan-out of panel events to every live subscriber
pub(crate) struct EventBus {
    subscribers: Vec<Sender<PanelEvent>>,
    /// Events raised before the first subscription, e.g. by auto-open at startup.
    /// `None` once someone has subscribed.
    backlog: Option<Vec<PanelEvent>>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            backlog: Some(Vec::new()),
        }
    }

    pub(crate) fn emit(&mut self, event: PanelEvent) {
        log::debug!("event: {event:?}");
        if let Some(backlog) = &mut self.backlog {
            if backlog.len() < BACKLOG_LIMIT {
                backlog.push(event);
            }
            return;
        }
        // A failed send means the receiver was dropped
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// New receiver for every event from now on. The first subscriber also
    /// gets whatever was raised before it.
    pub(crate) fn subscribe(&mut self) -> Receiver<PanelEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        for event in self.backlog.take().unwrap_or_default() {
            let _ = tx.send(event);
        }
        self.subscribers.push(tx);
        rx
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_every_event() {
        let mut bus = EventBus::new();
        let renderer = bus.subscribe();
        let transfer = bus.subscribe();

        bus.emit(PanelEvent::PortOpenStateChanged(true));
        bus.emit(PanelEvent::PortOpened { port: "COM1".into() });

        let expected = vec![
            PanelEvent::PortOpenStateChanged(true),
            PanelEvent::PortOpened { port: "COM1".into() },
        ];
        assert_eq!(renderer.try_iter().collect::<Vec<_>>(), expected);
        assert_eq!(transfer.try_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn events_before_first_subscription_go_to_first_subscriber() {
        let mut bus = EventBus::new();
        bus.emit(PanelEvent::PortOpenStateChanged(true));

        let first = bus.subscribe();
        let second = bus.subscribe();
        assert_eq!(first.try_recv(), Ok(PanelEvent::PortOpenStateChanged(true)));
        assert!(second.try_recv().is_err());
    }

    #[test]
    fn backlog_is_bounded() {
        let mut bus = EventBus::new();
        for _ in 0..BACKLOG_LIMIT + 10 {
            bus.emit(PanelEvent::PortOpenStateChanged(false));
        }
        assert_eq!(bus.subscribe().try_iter().count(), BACKLOG_LIMIT);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(PanelEvent::PortOpenStateChanged(false));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(PanelEvent::PortOpenStateChanged(false)));
    }
}
