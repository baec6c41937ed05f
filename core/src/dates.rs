use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Parse a release timestamp. Accepts RFC 3339 / ISO 8601 and a few plain
/// date layouts; anything else is treated as missing.
pub fn parse_release_date(raw: &str) -> Option<OffsetDateTime> {
    let s = raw.trim();
    if s.is_empty() { return None; }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) { return Some(dt); }
    if let Ok(dt) = OffsetDateTime::parse(s, &Iso8601::DEFAULT) { return Some(dt); }
    if let Ok(dt) = PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")) {
        return Some(dt.assume_utc());
    }
    if let Ok(dt) = PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")) {
        return Some(dt.assume_utc());
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .or_else(|_| Date::parse(s, format_description!("[year]/[month]/[day]")))
        .or_else(|_| Date::parse(s, format_description!("[month]/[day]/[year]")))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// Whole days from `since` to `now`, never negative. 0 when `since` is absent.
pub fn days_since(since: Option<OffsetDateTime>, now: OffsetDateTime) -> u32 {
    since
        .map(|d| (now - d).whole_days().max(0) as u32)
        .unwrap_or(0)
}

/// Ratings accumulated per day since release; 0 for apps released today or undated.
pub fn ratings_per_day(rating_count: u64, age_days: u32) -> f64 {
    if age_days == 0 { 0.0 } else { rating_count as f64 / age_days as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_common_layouts() {
        let expected = datetime!(2021-03-04 0:00 UTC);
        assert_eq!(parse_release_date("2021-03-04T00:00:00Z"), Some(expected));
        assert_eq!(parse_release_date("2021-03-04"), Some(expected));
        assert_eq!(parse_release_date("2021/03/04"), Some(expected));
        assert_eq!(parse_release_date("03/04/2021"), Some(expected));
        assert_eq!(parse_release_date("2021-03-04 00:00:00"), Some(expected));
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(parse_release_date(""), None);
        assert_eq!(parse_release_date("last tuesday"), None);
    }

    #[test]
    fn day_counts() {
        let now = datetime!(2024-01-01 12:00 UTC);
        assert_eq!(days_since(Some(datetime!(2023-01-01 12:00 UTC)), now), 365);
        assert_eq!(days_since(None, now), 0);
        assert_eq!(days_since(Some(datetime!(2025-01-01 0:00 UTC)), now), 0);
    }

    #[test]
    fn velocity() {
        assert_eq!(ratings_per_day(3650, 365), 10.0);
        assert_eq!(ratings_per_day(3650, 0), 0.0);
    }
}
