// Workload analysis returned by the model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Weekly load band, relative to the configured risk threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Normal,
    Moderate,
    High,
}

impl RiskLevel {
    /// Above the threshold is high risk; below three quarters of it is normal.
    pub fn classify(hours: f64, threshold: f64) -> Self {
        if hours > threshold {
            Self::High
        } else if hours < threshold * 0.75 {
            Self::Normal
        } else {
            Self::Moderate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Moderate => "Moderate",
            Self::High => "HIGH RISK",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadAnalysis {
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_hours: f64,

    /// Week start date ("YYYY-MM-DD") -> hours
    #[serde(default, deserialize_with = "weekly_hours")]
    pub weekly_breakdown: BTreeMap<String, f64>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub risk_weeks: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub priority_assignments: Vec<String>,
}

impl WorkloadAnalysis {
    /// Weeks in date order with their risk band
    pub fn classified_weeks(&self, threshold: f64) -> Vec<(&str, f64, RiskLevel)> {
        self.weekly_breakdown
            .iter()
            .map(|(week, hours)| (week.as_str(), *hours, RiskLevel::classify(*hours, threshold)))
            .collect()
    }

    /// Busiest week, if any
    pub fn peak_week(&self) -> Option<(&str, f64)> {
        self.weekly_breakdown
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(w, h)| (w.as_str(), *h))
    }
}

fn weekly_hours<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    let Value::Object(map) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(week, hours)| {
            let hours = match hours {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => lenient::parse_loose_number(&s)?,
                _ => return None,
            };
            Some((week, hours))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_bands_at_default_threshold() {
        assert_eq!(RiskLevel::classify(25.0, 20.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(20.0, 20.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(15.0, 20.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(14.5, 20.0), RiskLevel::Normal);
    }

    #[test]
    fn test_classify_scales_with_threshold() {
        assert_eq!(RiskLevel::classify(25.0, 30.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(31.0, 30.0), RiskLevel::High);
    }

    #[test]
    fn test_weekly_breakdown_skips_garbage() {
        let analysis: WorkloadAnalysis = serde_json::from_value(json!({
            "total_hours": 41,
            "weekly_breakdown": {
                "2025-09-08": 12,
                "2025-09-01": "22h",
                "2025-09-15": null
            },
            "risk_weeks": "2025-09-01"
        }))
        .unwrap();

        assert_eq!(analysis.total_hours, 41.0);
        assert_eq!(analysis.weekly_breakdown.len(), 2);
        assert_eq!(analysis.risk_weeks, vec!["2025-09-01"]);

        let weeks = analysis.classified_weeks(20.0);
        assert_eq!(weeks[0], ("2025-09-01", 22.0, RiskLevel::High));
        assert_eq!(weeks[1], ("2025-09-08", 12.0, RiskLevel::Normal));
        assert_eq!(analysis.peak_week(), Some(("2025-09-01", 22.0)));
    }

    #[test]
    fn test_empty_object_is_default() {
        let analysis: WorkloadAnalysis = serde_json::from_value(json!({})).unwrap();
        assert_eq!(analysis, WorkloadAnalysis::default());
        assert!(analysis.peak_week().is_none());
    }
}
