//! Text shown for timers, statuses and saved sessions.

use chrono::{DateTime, Local, TimeZone};

use crate::models::TrackingSession;
use crate::timer::{TrackingTimer, KICK_TARGET};

/// `mm:ss`, with minutes growing past two digits when needed.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// e.g. "Monday, 19 October 2026".
pub fn format_session_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%A, %-d %B %Y").to_string()
}

/// e.g. "3:05 PM".
pub fn format_session_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%-I:%M %p").to_string()
}

pub fn format_duration(minutes: u32) -> String {
    format!("{} mins", minutes)
}

fn plural(count: u64, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Headline and sub-line for the counter screen.
pub fn status_lines(timer: &TrackingTimer) -> (String, String) {
    match timer.kick_count() {
        0 => ("Tap button to start counting".to_string(), String::new()),
        n if n >= KICK_TARGET => (
            "Stop recording after".to_string(),
            format!("{} kicks", KICK_TARGET),
        ),
        n => (
            format!("Recording... {} of {} kicks", n, KICK_TARGET),
            format!("{} more to go", timer.remaining()),
        ),
    }
}

pub fn save_confirmation(session: &TrackingSession) -> String {
    format!(
        "You tracked {} in {}.",
        plural(session.kick_count as u64, "kick"),
        plural(session.time_in_minutes as u64, "minute")
    )
}

/// One history row in the local timezone: date, time and duration.
pub fn history_row(session: &TrackingSession) -> (String, String, String) {
    history_row_in(session, &Local)
}

pub fn history_row_in<Tz: TimeZone>(session: &TrackingSession, tz: &Tz) -> (String, String, String)
where
    Tz::Offset: std::fmt::Display,
{
    let local = session.date.with_timezone(tz);
    (
        format_session_date(&local),
        format_session_time(&local),
        format_duration(session.time_in_minutes),
    )
}

/// Plain-text history listing for the `history` command.
pub fn render_history(sessions: &[TrackingSession]) -> String {
    if sessions.is_empty() {
        return "No tracking sessions yet\n".to_string();
    }

    let rows: Vec<_> = sessions.iter().map(history_row).collect();
    let date_width = rows.iter().map(|(d, _, _)| d.len()).max().unwrap_or(0);
    let time_width = rows.iter().map(|(_, t, _)| t.len()).max().unwrap_or(0);
    let id_width = sessions.iter().map(|s| s.id.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (session, (date, time, duration)) in sessions.iter().zip(rows) {
        out.push_str(&format!(
            "{:<id_width$}  {:<date_width$}  {:>time_width$}  {:>8}  {:>2}/{} kicks\n",
            session.id, date, time, duration, session.kick_count, KICK_TARGET,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(kicks: u32, minutes: u32) -> TrackingSession {
        TrackingSession {
            id: "1".to_string(),
            date: Utc.with_ymd_and_hms(2026, 10, 19, 15, 5, 0).unwrap(),
            time_in_minutes: minutes,
            kick_count: kicks,
            created_at: 0,
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn test_history_row_in_utc() {
        let (date, time, duration) = history_row_in(&session(10, 3), &Utc);
        assert_eq!(date, "Monday, 19 October 2026");
        assert_eq!(time, "3:05 PM");
        assert_eq!(duration, "3 mins");
    }

    #[test]
    fn test_save_confirmation_pluralises() {
        assert_eq!(
            save_confirmation(&session(10, 3)),
            "You tracked 10 kicks in 3 minutes."
        );
        assert_eq!(
            save_confirmation(&session(1, 1)),
            "You tracked 1 kick in 1 minute."
        );
    }

    #[test]
    fn test_status_lines_follow_count() {
        let mut timer = TrackingTimer::new();
        assert_eq!(status_lines(&timer).0, "Tap button to start counting");

        for _ in 0..3 {
            timer.kick(Utc::now());
        }
        let (headline, sub) = status_lines(&timer);
        assert_eq!(headline, "Recording... 3 of 10 kicks");
        assert_eq!(sub, "7 more to go");

        for _ in 0..7 {
            timer.kick(Utc::now());
        }
        assert_eq!(
            status_lines(&timer),
            ("Stop recording after".to_string(), "10 kicks".to_string())
        );
    }

    #[test]
    fn test_empty_history_message() {
        assert_eq!(render_history(&[]), "No tracking sessions yet\n");
    }
}
