//! 經驗欄位解析："2-5 yrs"、"8–13 Yrs"、"5+ years"、"7 yrs"

use crate::domain::model::{ExperienceInterval, MAX_EXPERIENCE_YEARS};
use regex::Regex;
use std::sync::LazyLock;

/// 開放式年資 ("N+") 視為 N 到 N+5 年
pub const OPEN_ENDED_WIDTH: u32 = 5;

// 分隔符號支援連字號與 en dash
static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*[-\u{2013}]\s*(\d+)").expect("valid range regex"));
static SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(\s*\+)?").expect("valid single regex"));

/// 只有數字的捕獲群組解析失敗代表溢位，取 `u32::MAX`
fn years_of(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

fn find_range(text: &str) -> Option<(u32, u32)> {
    let caps = RANGE_RE.captures(text)?;
    Some((years_of(&caps[1]), years_of(&caps[2])))
}

/// 代表值：區間取平均，否則取第一個整數
pub fn parse_point(field: Option<&str>) -> Option<f64> {
    let text = field?.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((lo, hi)) = find_range(text) {
        return Some((f64::from(lo) + f64::from(hi)) / 2.0);
    }
    let caps = SINGLE_RE.captures(text)?;
    Some(f64::from(years_of(&caps[1])))
}

pub fn parse_interval(field: Option<&str>) -> Option<ExperienceInterval> {
    let text = field?.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((lo, hi)) = find_range(text) {
        // 反向時交換，上限截在 25 年
        return Some(ExperienceInterval::new(lo, hi));
    }

    let caps = SINGLE_RE.captures(text)?;
    let years = years_of(&caps[1]);
    if caps.get(2).is_some() {
        let upper = years.saturating_add(OPEN_ENDED_WIDTH).min(MAX_EXPERIENCE_YEARS);
        Some(ExperienceInterval::new(years, upper))
    } else {
        Some(ExperienceInterval::point(years))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(interval: Option<ExperienceInterval>) -> Option<(u32, u32)> {
        interval.map(|i| (i.min_years(), i.max_years()))
    }

    #[test]
    fn test_point_estimates() {
        assert_eq!(parse_point(Some("2-5 yrs")), Some(3.5));
        assert_eq!(parse_point(Some("3 – 7 years")), Some(5.0));
        assert_eq!(parse_point(Some("7 yrs")), Some(7.0));
        assert_eq!(parse_point(Some("Fresher")), None);
        assert_eq!(parse_point(Some("")), None);
        assert_eq!(parse_point(None), None);
    }

    #[test]
    fn test_interval_examples() {
        assert_eq!(bounds(parse_interval(Some("2-5 yrs"))), Some((2, 5)));
        assert_eq!(bounds(parse_interval(Some("8–13 Yrs"))), Some((8, 13)));
        assert_eq!(bounds(parse_interval(Some("5+ years"))), Some((5, 10)));
        assert_eq!(bounds(parse_interval(Some("7 yrs"))), Some((7, 7)));
        assert_eq!(parse_interval(Some("no experience needed")), None);
    }

    #[test]
    fn test_interval_reversed_and_clamped() {
        assert_eq!(bounds(parse_interval(Some("10-4 years"))), Some((4, 10)));
        assert_eq!(bounds(parse_interval(Some("15-30 years"))), Some((15, 25)));
        assert_eq!(bounds(parse_interval(Some("22+ yrs"))), Some((22, 25)));
        assert_eq!(bounds(parse_interval(Some("5 + years"))), Some((5, 10)));
    }

    #[test]
    fn test_interval_invariant_over_many_inputs() {
        let inputs = [
            "0-0", "1-2", "25-25", "30-40", "40-30", "99999999999-2", "12+", "25+", "0", "26",
            "3 - 1 yrs", "about 4+ years", "7 to 9", "x",
        ];
        for input in inputs {
            if let Some(interval) = parse_interval(Some(input)) {
                assert!(interval.min_years() <= interval.max_years(), "{input}");
                assert!(interval.max_years() <= MAX_EXPERIENCE_YEARS, "{input}");
            }
        }
    }

    #[test]
    fn test_overflowing_numbers_saturate() {
        assert_eq!(bounds(parse_interval(Some("2-99999999999"))), Some((2, 25)));
        assert_eq!(bounds(parse_interval(Some("99999999999 yrs"))), Some((25, 25)));
        assert_eq!(bounds(parse_interval(Some("99999999999+ yrs"))), Some((25, 25)));
        // 代表值超過 25 年，分組時會被捨棄
        assert!(parse_point(Some("2-99999999999")).unwrap() > 25.0);
        assert_eq!(parse_point(Some("99999999999 yrs")), Some(f64::from(u32::MAX)));
    }
}
