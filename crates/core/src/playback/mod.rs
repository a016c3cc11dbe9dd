//! Historical weather playback
//!
//! Lets an operator scrub through the look-back window of weather
//! observations, or let it replay on a timer, while the map redraws plumes
//! for whichever snapshot is selected.

pub mod config;
pub mod controller;
pub mod timer;

pub use config::{PlaybackConfig, PlaybackEnd, PlaybackSpeed};
pub use controller::{PlaybackController, PlaybackState};
pub use timer::{PlaybackTimer, TickHandle};
