use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::OdeError;

const OBSERVATION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Acquisition time bound, kept exactly as the caller wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ObservationTime(String);

impl ObservationTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObservationTime {
    type Err = OdeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        // chrono treats the fractional part as optional and allows up to nine
        // digits; the archive expects one to six.
        let has_fraction = trimmed
            .rsplit_once('.')
            .map(|(_, frac)| {
                (1..=6).contains(&frac.len()) && frac.chars().all(|ch| ch.is_ascii_digit())
            })
            .unwrap_or(false);
        let parsed = NaiveDateTime::parse_from_str(trimmed, OBSERVATION_TIME_FORMAT);
        if !has_fraction || parsed.is_err() {
            return Err(OdeError::InvalidObservationTime(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Filter set for one catalog query. Optional fields that are `None` are left
/// out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryParameters {
    pub target: String,
    pub ihid: String,
    pub iid: String,
    pub westernlon: Option<f64>,
    pub easternlon: Option<f64>,
    pub minlat: Option<f64>,
    pub maxlat: Option<f64>,
    pub minobtime: Option<ObservationTime>,
    pub maxobtime: Option<ObservationTime>,
    pub mininangle: Option<f64>,
    pub maxinangle: Option<f64>,
    pub minemangle: Option<f64>,
    pub maxemangle: Option<f64>,
    pub minphangle: Option<f64>,
    pub maxpjangle: Option<f64>,
}

impl QueryParameters {
    pub fn new(
        target: impl Into<String>,
        ihid: impl Into<String>,
        iid: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            ihid: ihid.into(),
            iid: iid.into(),
            ..Self::default()
        }
    }

    /// Present `(key, value)` pairs in declaration order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let text = [
            ("target", Some(self.target.clone())),
            ("ihid", Some(self.ihid.clone())),
            ("iid", Some(self.iid.clone())),
        ];
        let bounds = [
            ("westernlon", self.westernlon.map(|v| v.to_string())),
            ("easternlon", self.easternlon.map(|v| v.to_string())),
            ("minlat", self.minlat.map(|v| v.to_string())),
            ("maxlat", self.maxlat.map(|v| v.to_string())),
            ("minobtime", self.minobtime.as_ref().map(|t| t.to_string())),
            ("maxobtime", self.maxobtime.as_ref().map(|t| t.to_string())),
            ("mininangle", self.mininangle.map(|v| v.to_string())),
            ("maxinangle", self.maxinangle.map(|v| v.to_string())),
            ("minemangle", self.minemangle.map(|v| v.to_string())),
            ("maxemangle", self.maxemangle.map(|v| v.to_string())),
            ("minphangle", self.minphangle.map(|v| v.to_string())),
            ("maxpjangle", self.maxpjangle.map(|v| v.to_string())),
        ];

        text.into_iter()
            .chain(bounds)
            .filter_map(|(key, value)| match value {
                Some(value) if !value.is_empty() => Some((key, value)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_observation_time_valid() {
        let time: ObservationTime = "2009-01-15T08:35:42.169".parse().unwrap();
        assert_eq!(time.as_str(), "2009-01-15T08:35:42.169");
    }

    #[test]
    fn parse_observation_time_requires_fraction() {
        let err = "2009-01-15T08:35:42".parse::<ObservationTime>().unwrap_err();
        assert_matches!(err, OdeError::InvalidObservationTime(_));
    }

    #[test]
    fn parse_observation_time_rejects_garbage() {
        let err = "2009-13-45T99:00:00.0".parse::<ObservationTime>().unwrap_err();
        assert_matches!(err, OdeError::InvalidObservationTime(_));
    }

    #[test]
    fn parse_observation_time_caps_fraction_digits() {
        let micros: ObservationTime = "2009-01-15T08:35:42.123456".parse().unwrap();
        assert_eq!(micros.as_str(), "2009-01-15T08:35:42.123456");
        for value in ["2009-01-15T08:35:42.1234567", "2009-01-15T08:35:42.123456789"] {
            let err = value.parse::<ObservationTime>().unwrap_err();
            assert_matches!(err, OdeError::InvalidObservationTime(_));
        }
    }

    #[test]
    fn pairs_skip_absent_and_empty() {
        let mut params = QueryParameters::new("moon", "", "M3");
        params.minlat = Some(20.0);
        let keys: Vec<_> = params.pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["target", "iid", "minlat"]);
    }
}
