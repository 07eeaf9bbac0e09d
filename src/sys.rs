//! Platform-facing seams: geometry, screen metrics, time, and the window and
//! haptics hosts the reactor drives.

pub mod geometry;
pub mod haptics;
pub mod run_loop;
pub mod screen;
pub mod timer;
pub mod window;
