use std::time::Duration;

use tracing::trace;

/// Fire-and-forget vibration output.
pub trait HapticSink {
    fn vibrate(&mut self, duration: Duration);
}

impl<H: HapticSink + ?Sized> HapticSink for Box<H> {
    fn vibrate(&mut self, duration: Duration) { (**self).vibrate(duration) }
}

/// Sink used when haptics are disabled or the platform has no actuator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHaptics;

impl HapticSink for NoopHaptics {
    fn vibrate(&mut self, duration: Duration) {
        trace!(?duration, "haptic pulse dropped");
    }
}

/// Forwards pulses to `inner` only while `enabled` is set.
pub struct GatedHaptics<H> {
    inner: H,
    enabled: bool,
}

impl<H: HapticSink> GatedHaptics<H> {
    pub fn new(inner: H, enabled: bool) -> Self { GatedHaptics { inner, enabled } }
}

impl<H: HapticSink> HapticSink for GatedHaptics<H> {
    fn vibrate(&mut self, duration: Duration) {
        if self.enabled {
            self.inner.vibrate(duration);
        } else {
            trace!(?duration, "haptics disabled");
        }
    }
}
