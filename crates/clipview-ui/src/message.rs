use std::time::Instant;

use iced::Point;

#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic playback tick.
    Tick(Instant),
    /// Escape pressed or window close requested.
    Cancel,
    /// Pointer moved over the frame, in frame pixel coordinates.
    CursorMoved(Point),
    /// Left button pressed over the frame.
    Pressed,
}
