use advent_shared::bail;
use time::{Date, Duration};

use crate::CalendarWindow;

/// An activity and its position in the sequence. Identity is the position,
/// two positions may carry the same text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity<'a> {
    pub position: usize,
    pub text: &'a str,
}

/// Maps calendar dates to activities of a fixed ordered list.
///
/// The day `start_date` maps to position 0 and the sequence cycles
/// indefinitely in both directions: dates before `start_date` wrap to the end
/// of the list.
#[derive(Debug, Clone)]
pub struct Sequencer {
    start_date: Date,
    activities: Vec<String>,
}

impl Sequencer {
    pub fn new(
        start_date: Date,
        activities: impl IntoIterator<Item = impl Into<String>>,
    ) -> advent_shared::Result<Self> {
        let activities = activities.into_iter().map(Into::into).collect::<Vec<_>>();

        if activities.is_empty() {
            bail!("activity list must not be empty");
        }

        Ok(Self {
            start_date,
            activities,
        })
    }

    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Last day of the first pass through the list.
    pub fn end_date(&self) -> Date {
        self.date_of(self.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Signed number of days between `start_date` and `date`.
    pub fn days_elapsed(&self, date: Date) -> i64 {
        (date - self.start_date).whole_days()
    }

    /// Floor modulo of the elapsed days, always in `0..len`.
    pub fn position_for(&self, date: Date) -> usize {
        self.days_elapsed(date).rem_euclid(self.len() as i64) as usize
    }

    pub fn activity_for(&self, date: Date) -> Activity<'_> {
        let position = self.position_for(date);

        Activity {
            position,
            text: &self.activities[position],
        }
    }

    pub fn get(&self, position: usize) -> Option<Activity<'_>> {
        self.activities
            .get(position)
            .map(|text| Activity { position, text })
    }

    pub fn position_of(&self, text: &str) -> Option<usize> {
        self.activities.iter().position(|a| a == text)
    }

    pub fn date_of(&self, position: usize) -> Date {
        self.start_date
            .checked_add(Duration::days(position as i64))
            .unwrap_or(Date::MAX)
    }

    pub fn activities(&self) -> impl Iterator<Item = Activity<'_>> {
        self.activities
            .iter()
            .enumerate()
            .map(|(position, text)| Activity { position, text })
    }

    pub fn window(&self, today: Date) -> CalendarWindow<'_> {
        CalendarWindow::new(self, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_ACTIVITIES;
    use time::macros::date;

    fn sequencer() -> Sequencer {
        Sequencer::new(date!(2024 - 12 - 01), DEFAULT_ACTIVITIES).unwrap()
    }

    #[test]
    fn test_start_date_is_position_zero() {
        let sequencer = sequencer();
        let activity = sequencer.activity_for(date!(2024 - 12 - 01));

        assert_eq!(activity.position, 0);
        assert_eq!(activity.text, "Drink hot cocoa with marshmallows");
    }

    #[test]
    fn test_wraps_after_last_day() {
        let sequencer = sequencer();

        assert_eq!(sequencer.days_elapsed(date!(2024 - 12 - 26)), 25);
        assert_eq!(sequencer.position_for(date!(2024 - 12 - 26)), 0);
        assert_eq!(sequencer.position_for(date!(2024 - 12 - 25)), 24);
        assert_eq!(sequencer.end_date(), date!(2024 - 12 - 25));
    }

    #[test]
    fn test_dates_before_start_wrap_to_the_end() {
        let sequencer = sequencer();

        assert_eq!(sequencer.position_for(date!(2024 - 11 - 30)), 24);
        assert_eq!(sequencer.position_for(date!(2024 - 11 - 06)), 0);
        assert_eq!(sequencer.position_for(date!(2024 - 11 - 05)), 24);
    }

    #[test]
    fn test_periodicity() {
        let sequencer = sequencer();
        let period = Duration::days(sequencer.len() as i64);
        let mut day = date!(2024 - 10 - 01);

        while day < date!(2025 - 02 - 01) {
            for k in [-3i32, -1, 1, 2, 40] {
                let shifted = day + period * k;
                assert_eq!(sequencer.activity_for(day), sequencer.activity_for(shifted));
            }
            day = day.next_day().unwrap();
        }
    }

    #[test]
    fn test_total_over_extreme_dates() {
        let sequencer = sequencer();

        for day in [Date::MIN, date!(1970 - 01 - 01), Date::MAX] {
            assert!(sequencer.position_for(day) < sequencer.len());
        }
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let result = Sequencer::new(date!(2024 - 12 - 01), Vec::<String>::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_bounds_checked_access() {
        let sequencer = sequencer();

        assert_eq!(sequencer.get(2).unwrap().text, "Bake Christmas cookies");
        assert!(sequencer.get(25).is_none());
        assert!(sequencer.get(usize::MAX).is_none());
    }

    #[test]
    fn test_position_of_returns_first_match() {
        let sequencer =
            Sequencer::new(date!(2024 - 12 - 01), ["Sing", "Bake", "Sing"]).unwrap();

        assert_eq!(sequencer.position_of("Sing"), Some(0));
        assert_eq!(sequencer.position_of("Bake"), Some(1));
        assert_eq!(sequencer.position_of("Skate"), None);
    }
}
