// User-tunable settings, persisted to settings.json

use serde::{Deserialize, Serialize};

use super::StateError;

pub const MIN_POLL_SECONDS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daily study budget handed to the schedule prompt
    pub hours_per_day: u32,

    /// Weekly hours above which a week is flagged as risky
    pub risk_threshold: f64,

    /// How many days ahead the notification feed looks
    pub notification_lead_days: u32,

    pub notification_poll_seconds: u64,

    /// Background delivery is opt-in
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hours_per_day: 4,
            risk_threshold: 20.0,
            notification_lead_days: 3,
            notification_poll_seconds: 60,
            notifications_enabled: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), StateError> {
        if !(1..=24).contains(&self.hours_per_day) {
            return Err(StateError::invalid(
                "hours_per_day",
                format!("must be between 1 and 24, got {}", self.hours_per_day),
            ));
        }
        if !(self.risk_threshold.is_finite() && self.risk_threshold > 0.0) {
            return Err(StateError::invalid(
                "risk_threshold",
                format!("must be positive, got {}", self.risk_threshold),
            ));
        }
        if self.notification_lead_days == 0 {
            return Err(StateError::invalid(
                "notification_lead_days",
                "must be at least 1",
            ));
        }
        if self.notification_poll_seconds < MIN_POLL_SECONDS {
            return Err(StateError::invalid(
                "notification_poll_seconds",
                format!("must be at least {}s", MIN_POLL_SECONDS),
            ));
        }
        Ok(())
    }
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_lead_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_poll_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
}

impl SettingsUpdate {
    /// Build an update from `key=value` pairs (CLI `--set`)
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, StateError> {
        let mut update = Self::default();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| StateError::invalid(pair, "expected key=value"))?;
            update.set(key.trim(), value.trim())?;
        }
        Ok(update)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, StateError> {
            value
                .parse()
                .map_err(|_| StateError::invalid(key, format!("cannot parse '{}'", value)))
        }

        match key {
            "hours_per_day" => self.hours_per_day = Some(parse(key, value)?),
            "risk_threshold" => self.risk_threshold = Some(parse(key, value)?),
            "notification_lead_days" => self.notification_lead_days = Some(parse(key, value)?),
            "notification_poll_seconds" => {
                self.notification_poll_seconds = Some(parse(key, value)?)
            }
            "notifications_enabled" => self.notifications_enabled = Some(parse(key, value)?),
            other => return Err(StateError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `settings` only if the merged result is valid
    pub fn apply(&self, settings: &mut Settings) -> Result<(), StateError> {
        let mut merged = settings.clone();
        if let Some(v) = self.hours_per_day {
            merged.hours_per_day = v;
        }
        if let Some(v) = self.risk_threshold {
            merged.risk_threshold = v;
        }
        if let Some(v) = self.notification_lead_days {
            merged.notification_lead_days = v;
        }
        if let Some(v) = self.notification_poll_seconds {
            merged.notification_poll_seconds = v;
        }
        if let Some(v) = self.notifications_enabled {
            merged.notifications_enabled = v;
        }
        merged.validate()?;
        *settings = merged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert_eq!(s.hours_per_day, 4);
        assert_eq!(s.risk_threshold, 20.0);
        assert_eq!(s.notification_lead_days, 3);
        assert_eq!(s.notification_poll_seconds, 60);
        assert!(!s.notifications_enabled);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_saved_file_overlays_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"hours_per_day": 6, "email_enabled": true}"#).unwrap();
        assert_eq!(s.hours_per_day, 6);
        assert_eq!(s.risk_threshold, 20.0);
    }

    #[test]
    fn test_partial_update() {
        let mut s = Settings::default();
        let update: SettingsUpdate = serde_json::from_str(r#"{"risk_threshold": 15}"#).unwrap();
        update.apply(&mut s).unwrap();
        assert_eq!(s.risk_threshold, 15.0);
        assert_eq!(s.hours_per_day, 4);
    }

    #[test]
    fn test_invalid_update_leaves_settings_untouched() {
        let mut s = Settings::default();
        let update = SettingsUpdate {
            hours_per_day: Some(30),
            risk_threshold: Some(10.0),
            ..Default::default()
        };
        let err = update.apply(&mut s).unwrap_err();
        assert!(err.to_string().contains("hours_per_day"));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_poll_floor() {
        let mut s = Settings::default();
        let update = SettingsUpdate {
            notification_poll_seconds: Some(1),
            ..Default::default()
        };
        assert!(update.apply(&mut s).is_err());
    }

    #[test]
    fn test_from_pairs() {
        let update =
            SettingsUpdate::from_pairs(&["hours_per_day=5", "notifications_enabled = true"]).unwrap();
        assert_eq!(update.hours_per_day, Some(5));
        assert_eq!(update.notifications_enabled, Some(true));
        assert!(update.risk_threshold.is_none());
    }

    #[test]
    fn test_from_pairs_errors() {
        assert!(matches!(
            SettingsUpdate::from_pairs(&["colour=blue"]),
            Err(StateError::UnknownSetting(_))
        ));
        assert!(SettingsUpdate::from_pairs(&["hours_per_day"]).is_err());
        assert!(SettingsUpdate::from_pairs(&["hours_per_day=lots"]).is_err());
    }
}
