//! Idle-driven message loop.
//!
//! Pending input is always drained first; a frame is rendered only once the
//! queue is empty, after which the loop waits up to one frame interval for the
//! next event.

use std::time::Duration;

use log::{debug, info};

use crate::context::AppContext;
use crate::device::RenderDevice;
use crate::error::{DeviceError, Result};
use crate::render::{render_frame, FrameOutcome};
use crate::selection::Trigger;

/// Input, already translated from raw key and mouse codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Click,
    Advance,
    Digit(u8),
    Resize(u16, u16),
    Close,
}

/// Source of window/terminal events.
pub trait EventSource {
    /// Whether an event is available within `timeout`.
    fn poll(&mut self, timeout: Duration) -> Result<bool, DeviceError>;

    /// Take the next event; `None` for input the viewer ignores.
    fn read(&mut self) -> Result<Option<AppEvent>, DeviceError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub dropped_frames: u64,
    pub events: u64,
}

/// Map an event to a selection trigger, if it has one.
pub fn trigger_for(event: AppEvent) -> Option<Trigger> {
    match event {
        AppEvent::Click | AppEvent::Advance => Some(Trigger::Advance),
        AppEvent::Digit(0) => Some(Trigger::Reset),
        AppEvent::Digit(n) => Some(Trigger::Select(usize::from(n) - 1)),
        AppEvent::Resize(..) | AppEvent::Close => None,
    }
}

/// Returns `false` once the loop should stop.
fn dispatch<D: RenderDevice>(context: &mut AppContext<D>, event: AppEvent) -> bool {
    match event {
        AppEvent::Close => {
            info!("close requested");
            return false;
        }
        AppEvent::Resize(cols, rows) => context.device_mut().resize(cols, rows),
        other => {
            if let Some(trigger) = trigger_for(other) {
                let selection = context.selection.apply(trigger);
                debug!("{:?} -> selection {}", other, selection);
            }
        }
    }
    true
}

/// Run until a `Close` event arrives.
pub fn run<D: RenderDevice, E: EventSource>(
    context: &mut AppContext<D>,
    events: &mut E,
    frame_interval: Duration,
) -> Result<RunStats> {
    let mut stats = RunStats::default();
    loop {
        if events.poll(Duration::ZERO)? {
            if let Some(event) = events.read()? {
                stats.events += 1;
                if !dispatch(context, event) {
                    return Ok(stats);
                }
            }
            continue;
        }

        let elapsed = context.started.elapsed().as_secs_f32();
        match render_frame(context, elapsed)? {
            FrameOutcome::Drawn { .. } => stats.frames += 1,
            FrameOutcome::Skipped => stats.dropped_frames += 1,
        }

        // Idle until the next frame is due; input wakes us early.
        events.poll(frame_interval)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{count, Call, RecordingDevice};
    use crate::loader::SearchPath;
    use crate::program::ProgramSpec;
    use crate::selection::Selection;
    use std::collections::VecDeque;

    /// `None` entries are idle ticks; an exhausted script closes the window.
    struct ScriptedEvents(VecDeque<Option<AppEvent>>);

    impl ScriptedEvents {
        fn new(script: Vec<Option<AppEvent>>) -> Self {
            Self(script.into())
        }
    }

    impl EventSource for ScriptedEvents {
        fn poll(&mut self, _timeout: Duration) -> Result<bool, DeviceError> {
            match self.0.front() {
                Some(None) => {
                    self.0.pop_front();
                    Ok(false)
                }
                _ => Ok(true),
            }
        }

        fn read(&mut self) -> Result<Option<AppEvent>, DeviceError> {
            Ok(self.0.pop_front().unwrap_or(Some(AppEvent::Close)))
        }
    }

    fn shapes_context() -> (AppContext<RecordingDevice>, crate::device::recording::CallLog) {
        let (device, log) = RecordingDevice::new();
        let search = SearchPath::new(Vec::new());
        let context = crate::context::startup(device, ProgramSpec::shapes(), &search).unwrap();
        (context, log)
    }

    #[test]
    fn test_renders_only_on_idle_ticks() {
        let (mut context, log) = shapes_context();
        let mut events = ScriptedEvents::new(vec![
            None,
            Some(AppEvent::Click),
            Some(AppEvent::Click),
            None,
            None,
            Some(AppEvent::Close),
        ]);

        let stats = run(&mut context, &mut events, Duration::from_millis(1)).unwrap();
        // The idle wait after each frame also consumes one idle tick.
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.events, 3);
        assert_eq!(count(&log, |c| *c == Call::Present), 2);
        assert_eq!(context.selection.current(), Selection::Single(1));
    }

    #[test]
    fn test_digits_select_and_reset() {
        let (mut context, _log) = shapes_context();
        let mut events =
            ScriptedEvents::new(vec![Some(AppEvent::Digit(4)), Some(AppEvent::Digit(9))]);
        run(&mut context, &mut events, Duration::ZERO).unwrap();
        assert_eq!(context.selection.current(), Selection::Single(3));

        let mut events = ScriptedEvents::new(vec![Some(AppEvent::Digit(0))]);
        run(&mut context, &mut events, Duration::ZERO).unwrap();
        assert_eq!(context.selection.current(), Selection::All);
    }

    #[test]
    fn test_dropped_frames_keep_the_loop_running() {
        let (mut context, log) = shapes_context();
        context.device_mut().fail_begin = true;
        let mut events = ScriptedEvents::new(vec![
            None,
            Some(AppEvent::Advance),
            None,
            Some(AppEvent::Close),
        ]);

        let stats = run(&mut context, &mut events, Duration::ZERO).unwrap();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.dropped_frames, 2);
        assert_eq!(count(&log, |c| matches!(c, Call::Draw(..))), 0);
    }

    #[test]
    fn test_trigger_mapping() {
        assert_eq!(trigger_for(AppEvent::Click), Some(Trigger::Advance));
        assert_eq!(trigger_for(AppEvent::Digit(0)), Some(Trigger::Reset));
        assert_eq!(trigger_for(AppEvent::Digit(3)), Some(Trigger::Select(2)));
        assert_eq!(trigger_for(AppEvent::Close), None);
    }
}
