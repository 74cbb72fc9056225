//! Human-readable duration formatting
//!
//! Provides utilities to format durations into human-readable strings.

use std::time::Duration;

/// Format a duration into a human-readable string
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "runtime")]
/// # {
/// use std::time::Duration;
///
/// use oauthbroker_common::time::format::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(5)), "5s");
/// assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
/// assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m 5s");
/// # }
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs == 0 {
        let millis = duration.as_millis();
        if millis == 0 {
            return format!("{}us", duration.as_micros());
        }
        return format!("{}ms", millis);
    }

    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let components = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")];
    let start_index =
        components.iter().position(|(value, _)| *value > 0).unwrap_or(components.len() - 1);

    components[start_index..]
        .iter()
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a duration with milliseconds precision
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "runtime")]
/// # {
/// use std::time::Duration;
///
/// use oauthbroker_common::time::format::format_duration_ms;
///
/// assert_eq!(format_duration_ms(Duration::from_millis(1500)), "1s 500ms");
/// assert_eq!(format_duration_ms(Duration::from_millis(500)), "500ms");
/// # }
/// ```
pub fn format_duration_ms(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    let seconds = total_millis / 1000;
    let millis = total_millis % 1000;

    if seconds == 0 {
        return format!("{}ms", millis);
    }

    let formatted = format_duration(Duration::from_secs(seconds as u64));

    if millis > 0 {
        format!("{} {}ms", formatted, millis)
    } else {
        formatted
    }
}

/// Format a duration as a compact string (e.g., "1h30m")
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "runtime")]
/// # {
/// use std::time::Duration;
///
/// use oauthbroker_common::time::format::format_duration_compact;
///
/// assert_eq!(format_duration_compact(Duration::from_secs(5400)), "1h30m0s");
/// assert_eq!(format_duration_compact(Duration::from_secs(65)), "1m5s");
/// # }
/// ```
pub fn format_duration_compact(duration: Duration) -> String {
    format_duration(duration).replace(' ', "")
}

/// Format a duration in a verbose, human-friendly way
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "runtime")]
/// # {
/// use std::time::Duration;
///
/// use oauthbroker_common::time::format::format_duration_verbose;
///
/// assert_eq!(format_duration_verbose(Duration::from_secs(5)), "5 seconds");
/// assert_eq!(format_duration_verbose(Duration::from_secs(65)), "1 minute 5 seconds");
/// assert_eq!(format_duration_verbose(Duration::from_secs(3665)), "1 hour 1 minute 5 seconds");
/// # }
/// ```
pub fn format_duration_verbose(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs == 0 {
        let millis = duration.as_millis();
        if millis == 0 {
            return format!(
                "{} microsecond{}",
                duration.as_micros(),
                if duration.as_micros() == 1 { "" } else { "s" }
            );
        }
        return format!("{} millisecond{}", millis, if millis == 1 { "" } else { "s" });
    }

    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::new();

    if days > 0 {
        parts.push(format!("{} day{}", days, if days == 1 { "" } else { "s" }));
    }
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, if hours == 1 { "" } else { "s" }));
    }
    if minutes > 0 {
        parts.push(format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" }));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{} second{}", seconds, if seconds == 1 { "" } else { "s" }));
    }

    parts.join(" ")
}
