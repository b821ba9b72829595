use std::fmt;
use std::str::FromStr;

use crate::prelude::*;

/// One parsed alert range in the classic monitoring range grammar.
///
/// Bounds are integers; the value tested may be fractional after unit
/// conversion. Evaluation is a pure function of the spec and the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSpec {
    /// `N` — alert outside the inclusive range [0, N]
    Max(i64),
    /// `N:` — alert below N
    Min(i64),
    /// `~:N` — alert above N, no lower bound
    UpperOnly(i64),
    /// `N:M` — alert outside the inclusive range [N, M]
    Range(i64, i64),
    /// `@N:M` — inverted range, alert *inside* [N, M]
    Inside(i64, i64),
}

impl FromStr for ThresholdSpec {
    type Err = anyhow::Error;

    /// First matching form wins; each form evaluates exactly one condition,
    /// forms never combine.
    fn from_str(spec: &str) -> Result<Self> {
        if let Ok(max) = spec.parse::<i64>() {
            return Ok(Self::Max(max));
        }
        if let Some(min) = spec.strip_suffix(':')
            && let Ok(min) = min.parse::<i64>()
        {
            return Ok(Self::Min(min));
        }
        if let Some(max) = spec.strip_prefix("~:")
            && let Ok(max) = max.parse::<i64>()
        {
            return Ok(Self::UpperOnly(max));
        }
        if let Some((min, max)) = spec.split_once(':')
            && let (Ok(min), Ok(max)) = (min.parse::<i64>(), max.parse::<i64>())
        {
            return Ok(Self::Range(min, max));
        }
        if let Some(inner) = spec.strip_prefix('@')
            && let Some((min, max)) = inner.split_once(':')
            && let (Ok(min), Ok(max)) = (min.parse::<i64>(), max.parse::<i64>())
        {
            return Ok(Self::Inside(min, max));
        }
        Err(anyhow!("invalid range specification {spec:?}"))
    }
}

impl fmt::Display for ThresholdSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max(max) => write!(f, "{max}"),
            Self::Min(min) => write!(f, "{min}:"),
            Self::UpperOnly(max) => write!(f, "~:{max}"),
            Self::Range(min, max) => write!(f, "{min}:{max}"),
            Self::Inside(min, max) => write!(f, "@{min}:{max}"),
        }
    }
}

impl ThresholdSpec {
    /// Whether `value` lands in the alert region of this range.
    pub fn alerts(&self, value: f64) -> bool {
        match *self {
            Self::Max(max) => value < 0.0 || value > max as f64,
            Self::Min(min) => value < min as f64,
            Self::UpperOnly(max) => value > max as f64,
            Self::Range(min, max) => value < min as f64 || value > max as f64,
            Self::Inside(min, max) => min as f64 <= value && value <= max as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("90", ThresholdSpec::Max(90))]
    #[case("10:", ThresholdSpec::Min(10))]
    #[case("~:95", ThresholdSpec::UpperOnly(95))]
    #[case("80:90", ThresholdSpec::Range(80, 90))]
    #[case("@10:20", ThresholdSpec::Inside(10, 20))]
    #[case("-5:5", ThresholdSpec::Range(-5, 5))]
    fn parses_each_form(#[case] spec: &str, #[case] expected: ThresholdSpec) {
        assert_eq!(spec.parse::<ThresholdSpec>().unwrap(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case(":")]
    #[case("1.5")]
    #[case("10:20:30")]
    #[case("~:x")]
    #[case("@abc")]
    fn rejects_malformed_specs(#[case] spec: &str) {
        let err = spec.parse::<ThresholdSpec>().unwrap_err();
        assert!(err.to_string().contains("invalid range specification"));
    }

    #[rstest]
    #[case("90", 90.0, false)]
    #[case("90", 90.5, true)]
    #[case("90", 0.0, false)]
    #[case("10:", 9.0, true)]
    #[case("10:", 10.0, false)]
    #[case("~:95", 95.0, false)]
    #[case("~:95", 96.0, true)]
    // Scenario: warning 80:90 passes inside the inclusive range
    #[case("80:90", 85.0, false)]
    #[case("80:90", 80.0, false)]
    #[case("80:90", 90.0, false)]
    #[case("80:90", 95.0, true)]
    #[case("80:90", 79.5, true)]
    // Inverted range alerts *inside*, unlike the plain N:M form
    #[case("@10:20", 15.0, true)]
    #[case("@10:20", 10.0, true)]
    #[case("@10:20", 20.0, true)]
    #[case("@10:20", 9.99, false)]
    #[case("@10:20", 20.5, false)]
    fn evaluates_alert_regions(#[case] spec: &str, #[case] value: f64, #[case] alerts: bool) {
        let spec: ThresholdSpec = spec.parse().unwrap();
        assert_eq!(spec.alerts(value), alerts);
        // Pure function: a second evaluation cannot change the answer.
        assert_eq!(spec.alerts(value), alerts);
    }

    #[rstest]
    #[case("90")]
    #[case("10:")]
    #[case("~:95")]
    #[case("80:90")]
    #[case("@10:20")]
    fn displays_in_source_form(#[case] spec: &str) {
        assert_eq!(spec.parse::<ThresholdSpec>().unwrap().to_string(), spec);
    }
}
