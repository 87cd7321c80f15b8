//! Lifecycle stamps and workflow axes: Moment, Stamp, AxisState, RecordStatus.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point in time together with its integer epoch mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moment {
    pub at: DateTime<Utc>,
    pub timestamp: i64,
}

/// A moment plus the actor responsible for it (`*_at`, `*_at_timestamp`, `*_by`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub timestamp: i64,
    pub by: UserId,
}

impl Stamp {
    pub fn new(moment: Moment, by: UserId) -> Self {
        Self {
            at: moment.at,
            timestamp: moment.timestamp,
            by,
        }
    }

    pub fn moment(&self) -> Moment {
        Moment {
            at: self.at,
            timestamp: self.timestamp,
        }
    }
}

/// One of the two independent workflows a record moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Approval,
    Publication,
}

/// Which side of an axis a transition lands on.
///
/// `Positive` is approved / published, `Negative` is unapproved / unpublished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Positive,
    Negative,
}

/// Both sides of one axis.
///
/// Transitions only go through [`AxisState::mark`], so at most one side is set
/// afterwards. Both sides can still be present on data loaded from storage
/// that was written elsewhere; [`AxisState::status`] treats that as waiting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<Stamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<Stamp>,
}

impl AxisState {
    /// Set `side` to `stamp` and clear the opposite side.
    pub fn mark(&mut self, side: Side, stamp: Stamp) {
        match side {
            Side::Positive => {
                self.negative = None;
                self.positive = Some(stamp);
            }
            Side::Negative => {
                self.positive = None;
                self.negative = Some(stamp);
            }
        }
    }

    pub fn get(&self, side: Side) -> Option<&Stamp> {
        match side {
            Side::Positive => self.positive.as_ref(),
            Side::Negative => self.negative.as_ref(),
        }
    }

    pub fn status(&self) -> AxisStatus {
        match (self.positive.is_some(), self.negative.is_some()) {
            (true, false) => AxisStatus::Granted,
            (false, true) => AxisStatus::Withheld,
            _ => AxisStatus::Waiting,
        }
    }
}

/// Derived state of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisStatus {
    Granted,
    Withheld,
    Waiting,
}

impl AxisStatus {
    pub fn label(self, axis: Axis) -> &'static str {
        match (axis, self) {
            (Axis::Approval, AxisStatus::Granted) => "APPROVED",
            (Axis::Approval, AxisStatus::Withheld) => "REJECTED",
            (Axis::Approval, AxisStatus::Waiting) => "waiting to be approved",
            (Axis::Publication, AxisStatus::Granted) => "PUBLISHED",
            (Axis::Publication, AxisStatus::Withheld) => "UNPUBLISHED",
            (Axis::Publication, AxisStatus::Waiting) => "waiting to be published",
        }
    }
}

/// Combined approval and publication status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStatus {
    pub approval: AxisStatus,
    pub publication: AxisStatus,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Approval status: ({}), Publish status: ({})",
            self.approval.label(Axis::Approval),
            self.publication.label(Axis::Publication)
        )
    }
}

/// Outcome of an actor-requiring transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Applied,
    SkippedNoActor,
}

impl Transition {
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp(secs: i64, by: i64) -> Stamp {
        let at = Utc.timestamp_opt(secs, 0).unwrap();
        Stamp::new(Moment { at, timestamp: secs }, UserId(by))
    }

    #[test]
    fn mark_clears_opposite_side() {
        let mut axis = AxisState::default();
        axis.mark(Side::Positive, stamp(10, 1));
        assert_eq!(axis.positive.map(|s| s.by), Some(UserId(1)));
        assert!(axis.negative.is_none());

        axis.mark(Side::Negative, stamp(20, 2));
        assert!(axis.positive.is_none());
        assert_eq!(axis.negative.map(|s| s.timestamp), Some(20));
    }

    #[test]
    fn both_sides_set_reads_as_waiting() {
        let axis = AxisState {
            positive: Some(stamp(1, 1)),
            negative: Some(stamp(2, 2)),
        };
        assert_eq!(axis.status(), AxisStatus::Waiting);
    }

    #[test]
    fn status_display_matches_labels() {
        let status = RecordStatus {
            approval: AxisStatus::Withheld,
            publication: AxisStatus::Granted,
        };
        assert_eq!(
            status.to_string(),
            "Approval status: (REJECTED), Publish status: (PUBLISHED)"
        );
        let fresh = RecordStatus {
            approval: AxisStatus::Waiting,
            publication: AxisStatus::Waiting,
        };
        assert_eq!(
            fresh.to_string(),
            "Approval status: (waiting to be approved), Publish status: (waiting to be published)"
        );
    }
}
