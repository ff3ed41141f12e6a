use chrono::Weekday;

/// Locales with translation files under `locales/`
pub const SUPPORTED_LOCALES: [&str; 3] = ["ko", "en", "zh"];

/// Locale used when the requested one is not supported
pub const FALLBACK_LOCALE: &str = "en";

/// Map a requested locale (e.g. "ko-KR", "zh_CN") onto a supported one
pub fn normalize_locale(locale: &str) -> &'static str {
    let primary = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    SUPPORTED_LOCALES
        .iter()
        .find(|supported| **supported == primary)
        .copied()
        .unwrap_or(FALLBACK_LOCALE)
}

/// Set the process-wide default locale
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(normalize_locale(locale));
}

/// Look up a message in the given locale
pub fn message(key: &str, locale: &str) -> String {
    t!(key, locale = normalize_locale(locale)).to_string()
}

/// Localized title for a displayed month, e.g. "2024년 3월"
pub fn month_title(locale: &str, year: i32, month: u32) -> String {
    let locale = normalize_locale(locale);
    let month_name = message(&format!("calendar.month.m{}", month), locale);
    t!(
        "calendar.month_title",
        locale = locale,
        year = year,
        month = month,
        month_name = month_name
    )
    .to_string()
}

/// Weekday header labels starting from `week_start`
pub fn weekday_labels(locale: &str, week_start: Weekday) -> Vec<String> {
    let locale = normalize_locale(locale);
    let mut day = week_start;
    let mut labels = Vec::with_capacity(7);
    for _ in 0..7 {
        labels.push(message(&format!("calendar.weekday.{}", weekday_key(day)), locale));
        day = day.succ();
    }
    labels
}

fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("ko"), "ko");
        assert_eq!(normalize_locale("ko-KR"), "ko");
        assert_eq!(normalize_locale("zh_CN"), "zh");
        assert_eq!(normalize_locale("EN"), "en");
        assert_eq!(normalize_locale("fi"), "en");
        assert_eq!(normalize_locale(""), "en");
    }

    #[test]
    fn test_weekday_labels_follow_week_start() {
        let labels = weekday_labels("en", Weekday::Sun);
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0], "Sun");
        assert_eq!(labels[6], "Sat");

        let labels = weekday_labels("en", Weekday::Mon);
        assert_eq!(labels[0], "Mon");
        assert_eq!(labels[6], "Sun");
    }

    #[test]
    fn test_month_title() {
        assert_eq!(month_title("ko", 2024, 3), "2024년 3월");
        assert_eq!(month_title("en", 2024, 3), "March 2024");
    }
}
