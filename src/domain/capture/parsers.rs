//! Free-text answer parsing.
//!
//! Pure, total functions turning guest replies into typed values. A `None`
//! return always means "ask again"; parse failures are expected input, not
//! errors.

use chrono::{NaiveDate, NaiveTime};

/// Parses `YYYY-M-D` or `YYYY/M/D` into a calendar date.
///
/// Month and day may be one or two digits. Returns `None` on any other shape
/// or an invalid calendar date. Day-first and month-first orders are
/// deliberately unsupported; the prompts ask for ISO order.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let parts: Vec<&str> = trimmed.split(['-', '/']).collect();
    if parts.len() != 3 {
        return None;
    }
    let (y, m, d) = (parts[0], parts[1], parts[2]);
    if y.len() != 4 || m.is_empty() || m.len() > 2 || d.is_empty() || d.len() > 2 {
        return None;
    }
    if !all_digits(y) || !all_digits(m) || !all_digits(d) {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// Parses `H:MM` or `H.MM` with an optional trailing `am`/`pm`.
///
/// Twelve-hour inputs are normalized to 24-hour time. Returns `None` when
/// the pattern does not match or hour/minute are out of range.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let lowered = text.trim().to_ascii_lowercase();

    let (clock, meridiem) = if let Some(rest) = lowered.strip_suffix("pm") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else if let Some(rest) = lowered.strip_suffix("am") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else {
        (lowered.as_str(), None)
    };

    let (hh, mm) = clock.split_once([':', '.'])?;
    if hh.is_empty() || hh.len() > 2 || mm.len() != 2 || !all_digits(hh) || !all_digits(mm) {
        return None;
    }

    let mut hour: u32 = hh.parse().ok()?;
    let minute: u32 = mm.parse().ok()?;
    match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour += 12,
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parses a yes/no reply.
pub fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "yeah" | "yup" | "true" => Some(true),
        "n" | "no" | "nope" | "false" => Some(false),
        _ => None,
    }
}

/// Case-insensitive exact match of a trimmed reply against a choice set.
///
/// Returns the canonical key so callers store the set's casing, not the
/// guest's.
pub fn match_choice<'a>(text: &str, keys: &[&'a str]) -> Option<&'a str> {
    let wanted = text.trim();
    keys.iter()
        .find(|key| key.eq_ignore_ascii_case(wanted))
        .copied()
}

/// Interprets an optional free-text answer.
///
/// Empty input → `None` (still unanswered). A skip word (`skip`/`none`/`na`)
/// → `Some("")` (explicitly declined). Anything else → the trimmed text.
pub fn optional_text(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let trimmed = text.trim();
    if matches!(trimmed.to_ascii_lowercase().as_str(), "skip" | "none" | "na") {
        return Some(String::new());
    }
    Some(trimmed.to_string())
}

/// True when the guest asked to skip a non-text optional field.
pub fn is_skip_word(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("skip") || text.trim().is_empty()
}

enum Meridiem {
    Am,
    Pm,
}

fn all_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}
