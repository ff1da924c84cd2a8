use std::sync::OnceLock;

use regex::Regex;

/// Parsed bounds of a free-text salary such as `"$80k-$120k"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

fn range_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\$?(\d+)(?:k?)?\s*-?\s*\$?(\d+)?(?:k?)?").ok())
        .as_ref()
}

/// Parses a salary entered on the post-job form.
///
/// The thousands scale is decided once for the whole input: any `k` anywhere
/// multiplies both bounds, so `"$80k - $120000"` yields a max of 120,000,000.
/// Input with no digits yields no bounds.
pub fn parse_salary(input: &str) -> SalaryRange {
    let scale = if input.to_lowercase().contains('k') { 1000 } else { 1 };

    if let Some(caps) = range_pattern().and_then(|re| re.captures(input)) {
        let min = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map(|v| v.saturating_mul(scale));
        let max = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map(|v| v.saturating_mul(scale));
        return SalaryRange { min, max };
    }

    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    SalaryRange {
        min: digits.parse::<i64>().ok().map(|v| v.saturating_mul(scale)),
        max: None,
    }
}

fn thousands(value: i64) -> String {
    if value % 1000 == 0 {
        format!("{}k", value / 1000)
    } else {
        format!("{}k", value as f64 / 1000.0)
    }
}

fn grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Card display: `"$80k - $120k"` when both bounds are present, else `"Competitive"`.
pub fn format_salary_range(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min > 0 && max > 0 => {
            format!("${} - ${}", thousands(min), thousands(max))
        }
        _ => "Competitive".to_string(),
    }
}

/// Detail display with full figures.
pub fn format_salary_detail(min: Option<i64>, max: Option<i64>) -> String {
    match (min.filter(|v| *v > 0), max.filter(|v| *v > 0)) {
        (Some(min), Some(max)) => format!("${} - ${}", grouped(min), grouped(max)),
        (Some(min), None) => format!("From ${}", grouped(min)),
        (None, Some(max)) => format!("Up to ${}", grouped(max)),
        (None, None) => "Competitive".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_k_range() {
        assert_eq!(
            parse_salary("$80k - $120k"),
            SalaryRange {
                min: Some(80_000),
                max: Some(120_000)
            }
        );
        assert_eq!(
            parse_salary("80K-120K"),
            SalaryRange {
                min: Some(80_000),
                max: Some(120_000)
            }
        );
    }

    #[test]
    fn single_number_without_k_sets_only_min() {
        assert_eq!(
            parse_salary("95000"),
            SalaryRange {
                min: Some(95_000),
                max: None
            }
        );
    }

    #[test]
    fn k_anywhere_scales_both_bounds() {
        let range = parse_salary("$80k - $120000");
        assert_eq!(range.min, Some(80_000));
        assert_eq!(range.max, Some(120_000_000));
    }

    #[test]
    fn text_without_digits_has_no_bounds() {
        assert_eq!(parse_salary("Negotiable"), SalaryRange::default());
        assert_eq!(parse_salary(""), SalaryRange::default());
    }

    #[test]
    fn card_display() {
        assert_eq!(format_salary_range(Some(80_000), Some(120_000)), "$80k - $120k");
        assert_eq!(format_salary_range(Some(85_500), Some(90_000)), "$85.5k - $90k");
        assert_eq!(format_salary_range(Some(80_000), None), "Competitive");
        assert_eq!(format_salary_range(None, None), "Competitive");
    }

    #[test]
    fn detail_display() {
        assert_eq!(
            format_salary_detail(Some(80_000), Some(120_000)),
            "$80,000 - $120,000"
        );
        assert_eq!(format_salary_detail(Some(1_500_000), None), "From $1,500,000");
        assert_eq!(format_salary_detail(None, Some(999)), "Up to $999");
        assert_eq!(format_salary_detail(None, None), "Competitive");
    }
}
