use time::Date;

use crate::Sequencer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Today precedes the start date, nothing is shown.
    BeforeStart,
    Running { today: usize },
    /// Today is the last listed day or later: everything is unlocked and the
    /// today pointer stays on the last entry.
    AfterEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry<'a> {
    pub position: usize,
    pub text: &'a str,
    pub date: Date,
    pub unlocked: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone)]
pub struct CalendarWindow<'a> {
    pub state: WindowState,
    pub entries: Vec<WindowEntry<'a>>,
}

impl<'a> CalendarWindow<'a> {
    pub fn new(sequencer: &'a Sequencer, today: Date) -> Self {
        let last = sequencer.len() - 1;
        let elapsed = sequencer.days_elapsed(today);

        let state = if elapsed < 0 {
            WindowState::BeforeStart
        } else if elapsed >= last as i64 {
            WindowState::AfterEnd
        } else {
            WindowState::Running {
                today: elapsed as usize,
            }
        };

        let pointer = match state {
            WindowState::BeforeStart => {
                return Self {
                    state,
                    entries: vec![],
                };
            }
            WindowState::Running { today } => today,
            WindowState::AfterEnd => last,
        };

        let entries = sequencer
            .activities()
            .map(|activity| WindowEntry {
                position: activity.position,
                text: activity.text,
                date: sequencer.date_of(activity.position),
                unlocked: activity.position <= pointer,
                is_today: activity.position == pointer,
            })
            .collect();

        Self { state, entries }
    }

    pub fn today(&self) -> Option<usize> {
        match self.state {
            WindowState::BeforeStart => None,
            WindowState::Running { today } => Some(today),
            WindowState::AfterEnd => self.entries.len().checked_sub(1),
        }
    }

    pub fn is_before_start(&self) -> bool {
        self.state == WindowState::BeforeStart
    }

    pub fn is_after_end(&self) -> bool {
        self.state == WindowState::AfterEnd
    }
}
