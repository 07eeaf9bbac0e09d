//! Hit testing between the dragged bubble and the trash icon.

use std::time::Duration;

use tracing::debug;

use super::Reactor;
use crate::actor::broadcast::BroadcastEvent;
use crate::model::bubble::{BubbleId, WidgetState};
use crate::model::touch::TouchAction;
use crate::sys::haptics::HapticSink;
use crate::sys::window::WindowId;

pub struct CollisionArbiter;

impl CollisionArbiter {
    /// Reacts to a touch the bubble `id` has already handled.
    ///
    /// Effects fire on transitions only: entering the trash pulses the haptics
    /// and grows the icon, leaving it shrinks the icon and hands the bubble
    /// back to the finger. While inside, the capture point is refreshed on
    /// every sample since the icon may still be sliding in.
    pub fn on_bubble_touch(reactor: &mut Reactor, id: BubbleId, action: TouchAction) {
        let Some(bubble) = reactor.bubbles.get_mut(id) else {
            return;
        };
        let state = bubble.state();
        reactor.target = Some(id);

        match action {
            TouchAction::Move => {
                let intersecting =
                    bubble.window_drawing_rect().intersects(&reactor.trash.window_drawing_rect());
                if intersecting {
                    let (cx, cy) = reactor.trash.icon_center();
                    bubble.set_intersecting(cx, cy);
                }
                if intersecting && state != WidgetState::Intersecting {
                    debug!(?id, "Bubble entered trash");
                    let pulse = Duration::from_millis(reactor.config.haptics.intersect_duration_ms);
                    reactor.haptics.vibrate(pulse);
                    Self::scale_trash(reactor, true);
                    reactor.broadcast(BroadcastEvent::StateChanged {
                        bubble: id,
                        state: WidgetState::Intersecting,
                    });
                } else if !intersecting && state == WidgetState::Intersecting {
                    debug!(?id, "Bubble left trash");
                    bubble.set_normal();
                    Self::scale_trash(reactor, false);
                    reactor.broadcast(BroadcastEvent::StateChanged {
                        bubble: id,
                        state: WidgetState::Normal,
                    });
                }
            }
            TouchAction::Up | TouchAction::Cancel if state == WidgetState::Intersecting => {
                debug!(?id, "Bubble dropped on trash");
                let requests = bubble.set_finishing();
                reactor.apply_bubble_requests(id, requests);
                Self::scale_trash(reactor, false);
                reactor.broadcast(BroadcastEvent::StateChanged {
                    bubble: id,
                    state: WidgetState::Finishing,
                });
            }
            _ => {}
        }
    }

    fn scale_trash(reactor: &mut Reactor, scaled: bool) {
        if reactor.trash.set_scaled(scaled) {
            reactor.host.set_scale(WindowId::Trash, reactor.trash.scale());
        }
    }
}
