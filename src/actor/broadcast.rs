use serde::{Deserialize, Serialize};

use crate::model::bubble::{BubbleId, WidgetState};

/// Notifications for the embedding application.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum BroadcastEvent {
    /// A released drag picked its edge. `y` is the resting window Y.
    MovedToEdge {
        bubble: BubbleId,
        is_right: bool,
        y: i32,
    },
    StateChanged {
        bubble: BubbleId,
        state: WidgetState,
    },
    /// The last bubble was removed.
    FloatingFinished,
}

pub type BroadcastSender = crate::actor::Sender<BroadcastEvent>;
pub type BroadcastReceiver = crate::actor::Receiver<BroadcastEvent>;
