//! Debounced parameter captures.
//!
//! A press of the designated control emits one [`CaptureEvent`] onto a
//! channel read by the submission collaborator. Until the collaborator drops
//! the accompanying [`InFlight`] guard no further capture is emitted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};

use crate::edge::EdgeDetector;
use crate::mapping::ParameterSet;

/// Context describing what was on screen when the capture fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    pub title: String,
    pub author: String,
    pub text_set_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub parameters: ParameterSet,
    pub metadata: CaptureMetadata,
    pub frame: u64,
    pub timestamp: DateTime<Utc>,
}

/// Marks a capture as in flight until dropped.
#[derive(Debug)]
pub struct InFlight {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A capture handed to the collaborator together with its in-flight guard.
#[derive(Debug)]
pub struct PendingCapture {
    pub event: CaptureEvent,
    pub guard: InFlight,
}

impl PendingCapture {
    /// Splits off the event and releases the in-flight slot.
    pub fn complete(self) -> CaptureEvent {
        self.event
    }
}

/// Receiving side used by the submission collaborator.
#[derive(Debug, Clone)]
pub struct CaptureQueue {
    receiver: Receiver<PendingCapture>,
}

impl CaptureQueue {
    pub fn try_next(&self) -> Option<PendingCapture> {
        match self.receiver.try_recv() {
            Ok(pending) => Some(pending),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until a capture arrives or the trigger is dropped.
    pub fn recv(&self) -> Option<PendingCapture> {
        self.receiver.recv().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = PendingCapture> + '_ {
        self.receiver.iter()
    }
}

/// Turns press edges of one control into capture events.
#[derive(Debug)]
pub struct CaptureTrigger {
    edge: EdgeDetector,
    in_flight: Arc<AtomicBool>,
    sender: Sender<PendingCapture>,
}

impl CaptureTrigger {
    pub fn new() -> (Self, CaptureQueue) {
        let (sender, receiver) = unbounded();
        (
            Self {
                edge: EdgeDetector::new(),
                in_flight: Arc::new(AtomicBool::new(false)),
                sender,
            },
            CaptureQueue { receiver },
        )
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Feeds the control level for this frame. Returns `true` when a capture
    /// was emitted. Never blocks.
    pub fn observe(
        &mut self,
        pressed: bool,
        frame: u64,
        parameters: &ParameterSet,
        metadata: impl FnOnce() -> CaptureMetadata,
    ) -> bool {
        if !self.edge.update(pressed).is_rising() {
            return false;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!(frame, "capture skipped, previous capture still in flight");
            return false;
        }

        let event = CaptureEvent {
            parameters: *parameters,
            metadata: metadata(),
            frame,
            timestamp: Utc::now(),
        };
        let pending = PendingCapture {
            event,
            guard: InFlight {
                flag: self.in_flight.clone(),
            },
        };

        tracing::info!(
            frame,
            title = %pending.event.metadata.title,
            index = pending.event.metadata.text_set_index,
            "capture emitted"
        );

        // A closed channel drops the pending capture, which clears the flag.
        if self.sender.send(pending).is_err() {
            tracing::warn!(frame, "capture receiver is gone, capture discarded");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> CaptureMetadata {
        CaptureMetadata {
            title: "Night Window".into(),
            author: "Flow Text".into(),
            text_set_index: 2,
        }
    }

    #[test]
    fn long_hold_emits_exactly_once() {
        let (mut trigger, queue) = CaptureTrigger::new();
        let params = ParameterSet::DEFAULT;

        let emitted = (0..120)
            .filter(|frame| trigger.observe(true, *frame, &params, metadata))
            .count();
        assert_eq!(emitted, 1);

        let pending = queue.try_next().unwrap();
        assert_eq!(pending.event.metadata.text_set_index, 2);
        assert_eq!(pending.event.frame, 0);
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn release_alone_emits_nothing() {
        let (mut trigger, queue) = CaptureTrigger::new();
        assert!(!trigger.observe(false, 0, &ParameterSet::DEFAULT, metadata));
        assert!(!trigger.observe(false, 1, &ParameterSet::DEFAULT, metadata));
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn in_flight_capture_blocks_new_presses() {
        let (mut trigger, queue) = CaptureTrigger::new();
        let params = ParameterSet::DEFAULT;

        assert!(trigger.observe(true, 0, &params, metadata));
        trigger.observe(false, 1, &params, metadata);
        assert!(!trigger.observe(true, 2, &params, metadata));
        assert!(trigger.is_in_flight());

        let pending = queue.try_next().unwrap();
        let event = pending.complete();
        assert_eq!(event.frame, 0);
        assert!(!trigger.is_in_flight());

        trigger.observe(false, 3, &params, metadata);
        assert!(trigger.observe(true, 4, &params, metadata));
    }

    #[test]
    fn dropped_queue_does_not_wedge_the_trigger() {
        let (mut trigger, queue) = CaptureTrigger::new();
        drop(queue);
        assert!(!trigger.observe(true, 0, &ParameterSet::DEFAULT, metadata));
        assert!(!trigger.is_in_flight());
    }
}
