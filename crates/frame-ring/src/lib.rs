//! Frame Ring Buffer
//!
//! Bounded FIFO store of the most recent camera frames, fed continuously by
//! the frame-reader loop and consulted by evidence capture for pre-event
//! context. Capped at `fps × window` entries; oldest dropped on overflow.

mod buffer;
mod frame;

pub use buffer::FrameRingBuffer;
pub use frame::{CameraFrame, CameraSource, FrameError};
