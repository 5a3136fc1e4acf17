//! Human-readable value formatting per display unit.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;
const TIB: f64 = GIB * 1024.0;

/// Binary-prefixed byte size, e.g. "1.50 KiB".
pub fn format_bytes(b: f64) -> String {
    if b >= TIB {
        format!("{:.2} TiB", b / TIB)
    } else if b >= GIB {
        format!("{:.2} GiB", b / GIB)
    } else if b >= MIB {
        format!("{:.2} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.2} KiB", b / KIB)
    } else {
        format!("{:.0} B", b)
    }
}

/// A span given in seconds, scaled from days down to nanoseconds.
pub fn format_duration(sec: f64) -> String {
    if sec >= 86_400.0 {
        format!("{:.1}d", sec / 86_400.0)
    } else if sec >= 3_600.0 {
        format!("{:.1}h", sec / 3_600.0)
    } else if sec >= 60.0 {
        format!("{:.1}m", sec / 60.0)
    } else if sec >= 1.0 {
        format!("{:.2}s", sec)
    } else if sec >= 0.001 {
        format!("{:.1}ms", sec * 1e3)
    } else if sec >= 0.000_001 {
        format!("{:.1}µs", sec * 1e6)
    } else {
        format!("{:.0}ns", sec * 1e9)
    }
}

/// Compact count with k/M/G suffixes.
pub fn format_count(v: f64) -> String {
    if v >= 1e9 {
        format!("{:.2}G", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.2}k", v / 1e3)
    } else {
        format!("{:.0}", v)
    }
}

/// Magnitude-scaled number for values with no known unit.
pub fn format_generic(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if abs >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}k", v / 1e3)
    } else if abs >= 1.0 {
        format!("{:.2}", v)
    } else if abs >= 0.01 {
        format!("{:.3}", v)
    } else {
        format!("{:.4}", v)
    }
}

pub fn format_percent(v: f64) -> String {
    format!("{:.1}%", v)
}

/// Unix timestamp (seconds) shown relative to now, e.g. "5m3s ago".
pub fn format_timestamp(v: f64) -> String {
    format_timestamp_at(v, unix_now())
}

/// Like [`format_timestamp`] with an explicit current time.
pub fn format_timestamp_at(v: f64, now: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let diff = now - v;
    let Ok(span) = Duration::try_from_secs_f64(diff.abs()) else {
        return format_generic(v);
    };
    if diff < 0.0 {
        format!("in {}", format_rel_duration(span))
    } else {
        format!("{} ago", format_rel_duration(span))
    }
}

/// Coarse two-part duration: "42s", "3m7s", "2h15m", "4d3h", "1y20d".
pub fn format_rel_duration(d: Duration) -> String {
    let total_sec = d.as_secs();
    if total_sec < 60 {
        return format!("{}s", total_sec);
    }
    let total_min = total_sec / 60;
    if total_min < 60 {
        return format!("{}m{}s", total_min, total_sec % 60);
    }
    let total_hr = total_min / 60;
    if total_hr < 24 {
        return format!("{}h{}m", total_hr, total_min % 60);
    }
    let days = total_hr / 24;
    if days < 365 {
        return format!("{}d{}h", days, total_hr % 24);
    }
    format!("{}y{}d", days / 365, days % 365)
}

/// Current Unix time in seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}
