//! Date cell conversion between `DD.MM.YYYY` and the stored `YYYYMMDD`.
//!
//! Only the shape of the text is checked. Calendar validity is not, so a
//! stored `20230231` reads as `31.02.2023` and writes back unchanged.

/// Stored form of a date the writer cannot interpret.
pub const UNKNOWN_DATE: &str = "00000000";

/// Render the raw bytes of a date cell for display.
///
/// Blank (spaces or NULs) and `00000000` cells become empty. Eight ASCII
/// bytes are read as `YYYYMMDD` and rendered `DD.MM.YYYY`; anything else is
/// returned as `fallback` decodes it, trailing whitespace removed.
pub fn display_date(bytes: &[u8], fallback: impl FnOnce(&[u8]) -> String) -> String {
    if bytes.iter().all(|&b| b == b' ' || b == 0) || bytes == UNKNOWN_DATE.as_bytes() {
        return String::new();
    }

    if bytes.len() == 8 && bytes.is_ascii() {
        let part = |range: std::ops::Range<usize>| {
            bytes[range].iter().map(|&b| char::from(b)).collect::<String>()
        };
        return format!("{}.{}.{}", part(6..8), part(4..6), part(0..4));
    }

    fallback(bytes).trim_end().to_string()
}

/// Normalise a date value to `YYYYMMDD`.
///
/// Accepted shapes: `D.M.YYYY` / `DD.MM.YYYY`, `M/D/YY` / `M/D/YYYY`
/// (two-digit years below 50 are 20xx, the rest 19xx), ISO `YYYY-MM-DD`
/// with an optional time part, and `YYYYMMDD` itself.
#[must_use]
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();

    if value.len() == 8 && is_digits(value) {
        return Some(value.to_string());
    }

    if value.contains('.') {
        let [day, month, year] = split3(value, '.')?;
        if is_day_or_month(day) && is_day_or_month(month) && year.len() == 4 && is_digits(year) {
            return Some(format!("{year}{month:0>2}{day:0>2}"));
        }
        return None;
    }

    if value.contains('/') {
        let [month, day, year] = split3(value, '/')?;
        if !(is_day_or_month(day) && is_day_or_month(month) && is_digits(year)) {
            return None;
        }
        let year = match year.len() {
            4 => year.to_string(),
            2 => expand_two_digit_year(year)?,
            _ => return None,
        };
        return Some(format!("{year}{month:0>2}{day:0>2}"));
    }

    let date_part = value.split(['T', ' ']).next().unwrap_or(value);
    if date_part.contains('-') {
        let [year, month, day] = split3(date_part, '-')?;
        if year.len() == 4 && is_digits(year) && is_day_or_month(month) && is_day_or_month(day) {
            return Some(format!("{year}{month:0>2}{day:0>2}"));
        }
    }

    None
}

/// True when `value` has one of the shapes [`normalize_date`] accepts for
/// user-facing dates (`DD.MM.YYYY` or `M/D/YY[YY]`).
#[must_use]
pub fn looks_like_date(value: &str) -> bool {
    let value = value.trim();
    if let Some([day, month, year]) = split3(value, '.') {
        return day.len() == 2
            && month.len() == 2
            && year.len() == 4
            && [day, month, year].iter().all(|p| is_digits(p));
    }
    if let Some([month, day, year]) = split3(value, '/') {
        return is_day_or_month(month)
            && is_day_or_month(day)
            && (year.len() == 2 || year.len() == 4)
            && is_digits(year);
    }
    false
}

fn split3(value: &str, sep: char) -> Option<[&str; 3]> {
    let mut parts = value.split(sep);
    let first = parts.next()?;
    let second = parts.next()?;
    let third = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some([first, second, third])
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_day_or_month(value: &str) -> bool {
    (1..=2).contains(&value.len()) && is_digits(value)
}

fn expand_two_digit_year(year: &str) -> Option<String> {
    let yy: u32 = year.parse().ok()?;
    let century = if yy < 50 { 2000 } else { 1900 };
    Some((century + yy).to_string())
}
