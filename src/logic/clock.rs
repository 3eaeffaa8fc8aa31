//! Clock display: seconds to `MM:SS` (or `H:MM:SS` past an hour).

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / HOUR;
    let minutes = (total_seconds % HOUR) / MINUTE;
    let seconds = total_seconds % MINUTE;
    if hours == 0 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}
