use anyhow::{Context, Result};
use time::{Date, macros::format_description};

use crate::{clock::Clock, config::Config};

/// Prints which activity each day maps to, starting at `from` (default:
/// today) for `days` days.
pub fn schedule(config: Config, from: Option<String>, days: u16) -> Result<()> {
    let clock = Clock::system(config.calendar.timezone.to_owned());
    let from = match from {
        Some(from) => Date::parse(&from, format_description!("[year]-[month]-[day]"))
            .with_context(|| format!("invalid --from date '{from}'"))?,
        None => clock.today(),
    };

    for line in lines(&config, from, days)? {
        println!("{line}");
    }

    Ok(())
}

fn lines(config: &Config, from: Date, days: u16) -> Result<Vec<String>> {
    let start_date = config.calendar.start_date()?;
    let sequencer =
        advent_activity::Sequencer::new(start_date, config.calendar.activities.iter().cloned())?;

    let mut lines = Vec::with_capacity(days as usize);
    let mut date = from;

    for _ in 0..days {
        let activity = sequencer.activity_for(date);
        lines.push(format!("{date}  #{:<2}  {}", activity.position, activity.text));

        let Some(next) = date.next_day() else {
            break;
        };
        date = next;
    }

    Ok(lines)
}
