//! Human-readable duration rendering.

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Formats a millisecond duration using the largest applicable units.
///
/// Hours and minutes; seconds only when the whole duration is under one
/// minute. Zero-valued components are omitted, and anything shorter than a
/// whole second renders as the zero-duration string `"0 minutes"`. Never
/// panics.
#[must_use]
pub fn format_duration(ms: i64) -> String {
    if ms < MS_PER_SECOND {
        return "0 minutes".to_string();
    }
    if ms < MS_PER_MINUTE {
        return unit(ms / MS_PER_SECOND, "second");
    }

    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;

    match (hours, minutes) {
        (0, m) => unit(m, "minute"),
        (h, 0) => unit(h, "hour"),
        (h, m) => format!("{} {}", unit(h, "hour"), unit(m, "minute")),
    }
}

fn unit(value: i64, name: &str) -> String {
    if value == 1 {
        format!("1 {name}")
    } else {
        format!("{value} {name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_render_as_zero_minutes() {
        assert_eq!(format_duration(0), "0 minutes");
        assert_eq!(format_duration(-5_000), "0 minutes");
    }

    #[test]
    fn sub_second_durations_are_the_zero_case() {
        // Never "0 seconds": below one whole second the zero-duration string
        // applies.
        assert_eq!(format_duration(1), "0 minutes");
        assert_eq!(format_duration(500), "0 minutes");
        assert_eq!(format_duration(999), "0 minutes");
        assert_eq!(format_duration(1_000), "1 second");
    }

    #[test]
    fn sub_minute_durations_use_seconds() {
        assert_eq!(format_duration(1_000), "1 second");
        assert_eq!(format_duration(59_000), "59 seconds");
        assert_eq!(format_duration(59_999), "59 seconds");
    }

    #[test]
    fn seconds_disappear_at_the_minute_boundary() {
        assert_eq!(format_duration(60_000), "1 minute");
        assert_eq!(format_duration(61_000), "1 minute");
    }

    #[test]
    fn minutes_only_below_one_hour() {
        assert_eq!(format_duration(25 * 60 * 1_000), "25 minutes");
    }

    #[test]
    fn whole_hours_omit_zero_minutes() {
        assert_eq!(format_duration(7_200_000), "2 hours");
        assert_eq!(format_duration(3_600_000), "1 hour");
    }

    #[test]
    fn hours_and_minutes_combine() {
        assert_eq!(format_duration(90 * 60 * 1_000), "1 hour 30 minutes");
        assert_eq!(format_duration(3_661_000), "1 hour 1 minute");
    }
}
