//! Weight overrides and the sum-to-100 editor.
//!
//! [`apply`] never touches the configuration it is given. Overrides are
//! written into a disposable copy, and that copy is only returned once every
//! name resolved and the weights of all entries add up to exactly 100. Any
//! error leaves the caller with nothing it could publish.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::index::OriginIndex;
use crate::model::LoadBalancerConfiguration;

/// Required total of all data-center weights.
pub const REQUIRED_TOTAL: f64 = 100.0;

/// Reasons an override batch was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    /// An override named a data center absent from the configuration.
    #[error("data center {name} not found")]
    UnknownDataCenter {
        /// The unresolvable name.
        name: String,
    },
    /// The edited weights do not add up to 100.
    #[error("weights sum = {actual}")]
    WeightSum {
        /// Total of all weights after the edit.
        actual: f64,
    },
}

/// Errors produced when parsing a `NAME:PERCENT,...` override list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideParseError {
    /// The list contained no pairs.
    #[error("data center list is empty")]
    Empty,
    /// A pair lacked the `:` separator.
    #[error("'{0}' is not in NAME:PERCENT form")]
    MissingSeparator(String),
    /// A pair had an empty name.
    #[error("'{0}' has an empty data center name")]
    EmptyName(String),
    /// A percentage was not a finite number.
    #[error("'{value}' is not a valid percentage for {name}")]
    InvalidPercent {
        /// Data center the value was given for.
        name: String,
        /// Raw percentage text.
        value: String,
    },
}

/// Ordered set of `name → percent` overrides.
///
/// Inserting a name twice keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightOverrides {
    entries: Vec<(String, f64)>,
}

impl WeightOverrides {
    /// Creates an empty override set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the override for `name`.
    pub fn insert(&mut self, name: impl Into<String>, percent: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = percent,
            None => self.entries.push((name, percent)),
        }
    }

    /// Override for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, percent)| *percent)
    }

    /// Iterates overrides in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, percent)| (name.as_str(), *percent))
    }

    /// Number of overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no overrides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for WeightOverrides {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (name, percent) in iter {
            overrides.insert(name, percent);
        }
        overrides
    }
}

impl FromStr for WeightOverrides {
    type Err = OverrideParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.trim().is_empty() {
            return Err(OverrideParseError::Empty);
        }
        let mut overrides = Self::new();
        for pair in input.split(',') {
            let (name, value) = pair
                .split_once(':')
                .ok_or_else(|| OverrideParseError::MissingSeparator(pair.to_owned()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(OverrideParseError::EmptyName(pair.to_owned()));
            }
            let percent = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|percent| percent.is_finite())
                .ok_or_else(|| OverrideParseError::InvalidPercent {
                    name: name.to_owned(),
                    value: value.trim().to_owned(),
                })?;
            overrides.insert(name, percent);
        }
        Ok(overrides)
    }
}

impl fmt::Display for WeightOverrides {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, (name, percent)) in self.iter().enumerate() {
            if position > 0 {
                formatter.write_str(",")?;
            }
            write!(formatter, "{name}:{percent}")?;
        }
        Ok(())
    }
}

/// Applies `overrides` to a copy of `config` and validates the result.
///
/// `index` must have been built from `config.data_centers`. Entries not named
/// in `overrides` keep their weights.
///
/// # Errors
/// Returns [`WeightError::UnknownDataCenter`] for the first name that does
/// not resolve, or [`WeightError::WeightSum`] when the edited total differs
/// from 100.
pub fn apply(
    config: &LoadBalancerConfiguration,
    index: &OriginIndex,
    overrides: &WeightOverrides,
) -> Result<LoadBalancerConfiguration, WeightError> {
    let mut working = config.clone();
    for (name, percent) in overrides.iter() {
        let entry = index
            .slot(name)
            .and_then(|slot| working.data_centers.get_mut(slot))
            .filter(|entry| entry.origin_id == name)
            .ok_or_else(|| {
                warn!(data_center = name, "data center not found");
                WeightError::UnknownDataCenter {
                    name: name.to_owned(),
                }
            })?;
        entry.percent = percent;
        debug!(data_center = name, percent, "weight staged");
    }
    validate(&working)?;
    Ok(working)
}

/// Checks that the weights of `config` add up to exactly 100.
///
/// # Errors
/// Returns [`WeightError::WeightSum`] carrying the actual total.
pub fn validate(config: &LoadBalancerConfiguration) -> Result<(), WeightError> {
    let actual = total_percent(config);
    #[expect(clippy::float_cmp, reason = "the remote system requires an exact total")]
    let exact = actual == REQUIRED_TOTAL;
    if exact {
        Ok(())
    } else {
        warn!(actual, "weights do not add up to 100");
        Err(WeightError::WeightSum { actual })
    }
}

/// Sum of all data-center weights, in sequence order.
#[must_use]
pub fn total_percent(config: &LoadBalancerConfiguration) -> f64 {
    config.data_centers.iter().map(|entry| entry.percent).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataCenterEntry;
    use rstest::{fixture, rstest};

    #[fixture]
    fn base() -> LoadBalancerConfiguration {
        LoadBalancerConfiguration::new(
            "alb_example",
            3,
            vec![
                DataCenterEntry::new("Dallas", 40.0),
                DataCenterEntry::new("Fairfield", 30.0),
                DataCenterEntry::new("Alpharetta", 30.0),
            ],
        )
    }

    fn weights(config: &LoadBalancerConfiguration) -> Vec<(String, f64)> {
        config
            .data_centers
            .iter()
            .map(|entry| (entry.origin_id.clone(), entry.percent))
            .collect()
    }

    #[rstest]
    fn full_override_is_applied(base: LoadBalancerConfiguration) {
        let index = OriginIndex::build(&base.data_centers);
        let overrides: WeightOverrides = "Dallas:10,Fairfield:30,Alpharetta:60"
            .parse()
            .expect("parse overrides");
        let updated = apply(&base, &index, &overrides).expect("apply overrides");
        assert_eq!(
            weights(&updated),
            vec![
                (String::from("Dallas"), 10.0),
                (String::from("Fairfield"), 30.0),
                (String::from("Alpharetta"), 60.0),
            ]
        );
        assert_eq!(total_percent(&updated), 100.0);
    }

    #[rstest]
    fn partial_override_keeps_untouched_entries(base: LoadBalancerConfiguration) {
        let index = OriginIndex::build(&base.data_centers);
        let overrides: WeightOverrides = [("Dallas", 20.0), ("Fairfield", 50.0)]
            .into_iter()
            .collect();
        let updated = apply(&base, &index, &overrides).expect("apply overrides");
        assert_eq!(updated.data_centers[2].percent, 30.0);
    }

    #[rstest]
    fn short_total_is_rejected(base: LoadBalancerConfiguration) {
        let index = OriginIndex::build(&base.data_centers);
        let overrides: WeightOverrides = [("Dallas", 10.0), ("Fairfield", 30.0)]
            .into_iter()
            .collect();
        let error = apply(&base, &index, &overrides).unwrap_err();
        assert_eq!(error, WeightError::WeightSum { actual: 70.0 });
    }

    #[rstest]
    fn unknown_name_rejects_whole_batch(base: LoadBalancerConfiguration) {
        let index = OriginIndex::build(&base.data_centers);
        let overrides: WeightOverrides = [("Dallas", 20.0), ("DCX", 80.0)].into_iter().collect();
        let error = apply(&base, &index, &overrides).unwrap_err();
        assert_eq!(
            error,
            WeightError::UnknownDataCenter {
                name: String::from("DCX")
            }
        );
        assert_eq!(base.data_centers[0].percent, 40.0, "source must stay untouched");
    }

    #[rstest]
    fn empty_overrides_validate_source(base: LoadBalancerConfiguration) {
        let index = OriginIndex::build(&base.data_centers);
        let unchanged = apply(&base, &index, &WeightOverrides::new()).expect("valid source");
        assert_eq!(unchanged, base);
    }

    #[test]
    fn empty_overrides_expose_corrupt_source() {
        let corrupt = LoadBalancerConfiguration::new(
            "alb_example",
            1,
            vec![DataCenterEntry::new("Dallas", 55.0)],
        );
        let index = OriginIndex::build(&corrupt.data_centers);
        let error = apply(&corrupt, &index, &WeightOverrides::new()).unwrap_err();
        assert_eq!(error, WeightError::WeightSum { actual: 55.0 });
    }

    #[test]
    fn stale_index_does_not_write_wrong_entry() {
        let config = LoadBalancerConfiguration::new(
            "alb_example",
            1,
            vec![
                DataCenterEntry::new("Fairfield", 50.0),
                DataCenterEntry::new("Dallas", 50.0),
            ],
        );
        let stale = OriginIndex::build(&[DataCenterEntry::new("Dallas", 100.0)]);
        let overrides: WeightOverrides = [("Dallas", 50.0)].into_iter().collect();
        let error = apply(&config, &stale, &overrides).unwrap_err();
        assert!(matches!(error, WeightError::UnknownDataCenter { .. }));
    }

    #[rstest]
    #[case("DC1:20,DC2:35,DC3:45", &[("DC1", 20.0), ("DC2", 35.0), ("DC3", 45.0)])]
    #[case(" DC1 : 20 , DC2:80", &[("DC1", 20.0), ("DC2", 80.0)])]
    #[case("DC1:20,DC2:30,DC1:50", &[("DC1", 50.0), ("DC2", 30.0)])]
    #[case("DC1:0", &[("DC1", 0.0)])]
    fn parses_override_lists(#[case] input: &str, #[case] expected: &[(&str, f64)]) {
        let overrides: WeightOverrides = input.parse().expect("parse overrides");
        let actual: Vec<(&str, f64)> = overrides.iter().collect();
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case("", OverrideParseError::Empty)]
    #[case("DC1", OverrideParseError::MissingSeparator(String::from("DC1")))]
    #[case(":20", OverrideParseError::EmptyName(String::from(":20")))]
    #[case(
        "DC1:lots",
        OverrideParseError::InvalidPercent { name: String::from("DC1"), value: String::from("lots") }
    )]
    #[case(
        "DC1:NaN",
        OverrideParseError::InvalidPercent { name: String::from("DC1"), value: String::from("NaN") }
    )]
    fn rejects_malformed_override_lists(#[case] input: &str, #[case] expected: OverrideParseError) {
        assert_eq!(input.parse::<WeightOverrides>().unwrap_err(), expected);
    }

    #[test]
    fn display_renders_override_list() {
        let overrides: WeightOverrides = [("Dallas", 10.0), ("Fairfield", 90.5)]
            .into_iter()
            .collect();
        assert_eq!(overrides.to_string(), "Dallas:10,Fairfield:90.5");
    }
}
