//! Progress streams for the presentation layer.
//!
//! The engine writes two append-only feeds:
//! - status events (stage changes, per-scorer start/finish)
//! - individually completed recommendations (one per contribution)
//!
//! Both are unbounded mpsc channels. Sends never block and a dropped
//! receiver is ignored, so nothing the presentation side does can stall or
//! corrupt a run.

use scorers::{ScoreContribution, ScorerKind};
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Started,
    ScorerStarted,
    ScorerCompleted,
    ScorerCancelled,
    PrimaryReady,
    AwaitingStragglers,
    Aggregating,
    Done,
}

/// One status update
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub stage: Stage,
    pub scorer: Option<ScorerKind>,
    pub message: String,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scorer {
            Some(scorer) => write!(f, "[{}] {}", scorer, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Write side of the progress feeds. Cheap to clone into tasks.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    status: Option<UnboundedSender<StatusEvent>>,
    recommendations: Option<UnboundedSender<ScoreContribution>>,
}

/// Read side of the progress feeds
#[derive(Debug)]
pub struct ProgressStreams {
    pub status: UnboundedReceiver<StatusEvent>,
    pub recommendations: UnboundedReceiver<ScoreContribution>,
}

impl ProgressSink {
    /// A sink that drops every event
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A connected sink plus the receivers to drain
    pub fn channel() -> (Self, ProgressStreams) {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (rec_tx, rec_rx) = mpsc::unbounded_channel();
        (
            Self {
                status: Some(status_tx),
                recommendations: Some(rec_tx),
            },
            ProgressStreams {
                status: status_rx,
                recommendations: rec_rx,
            },
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.status.is_some() || self.recommendations.is_some()
    }

    pub fn status(&self, stage: Stage, scorer: Option<ScorerKind>, message: impl Into<String>) {
        if let Some(tx) = &self.status {
            // Receiver gone means nobody is watching
            let _ = tx.send(StatusEvent {
                stage,
                scorer,
                message: message.into(),
            });
        }
    }

    pub fn recommendations(&self, contributions: &[ScoreContribution]) {
        if let Some(tx) = &self.recommendations {
            for contribution in contributions {
                if tx.send(contribution.clone()).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_in_order() {
        let (sink, mut streams) = ProgressSink::channel();

        sink.status(Stage::Started, None, "starting");
        sink.status(Stage::ScorerCompleted, Some(ScorerKind::Genre), "done");
        sink.recommendations(&[
            ScoreContribution::new(1, 1.0, "a", ScorerKind::Genre),
            ScoreContribution::new(2, 2.0, "b", ScorerKind::Genre),
        ]);

        assert_eq!(streams.status.try_recv().unwrap().stage, Stage::Started);
        let second = streams.status.try_recv().unwrap();
        assert_eq!(second.to_string(), "[Genre] done");
        assert_eq!(streams.recommendations.try_recv().unwrap().item_id, 1);
        assert_eq!(streams.recommendations.try_recv().unwrap().item_id, 2);
        assert!(streams.recommendations.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receivers_are_ignored() {
        let (sink, streams) = ProgressSink::channel();
        drop(streams);

        sink.status(Stage::Done, None, "nobody listening");
        sink.recommendations(&[ScoreContribution::new(1, 1.0, "a", ScorerKind::Tag)]);
    }

    #[test]
    fn test_disabled_sink() {
        let sink = ProgressSink::disabled();
        assert!(!sink.is_enabled());
        sink.status(Stage::Started, None, "ignored");
    }
}
