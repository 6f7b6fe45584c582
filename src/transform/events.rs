//! Play-event filter

use crate::source::LogEvent;
use crate::types::PLAY_EVENT_PAGE;
use rayon::prelude::*;

/// True when the event is a song play
pub fn is_play_event(event: &LogEvent) -> bool {
    event.page.as_deref() == Some(PLAY_EVENT_PAGE)
}

/// Keep only song-play events, preserving order
pub fn filter_play_events(events: Vec<LogEvent>) -> Vec<LogEvent> {
    events.into_par_iter().filter(is_play_event).collect()
}
