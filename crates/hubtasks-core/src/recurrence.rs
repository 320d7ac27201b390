//! Recurrence rules for repeating tasks.
//!
//! A [`RecurrenceRule`] describes how a task repeats: every `interval`
//! days, weeks (optionally on specific weekdays) or months, bounded by an
//! optional `count` of occurrences and an optional inclusive `until` date.
//!
//! Rules arrive as JSON documents edited by a human. They are parsed into an
//! untyped shape first and converted with `TryFrom`, so a malformed rule is
//! rejected at the boundary with an [`InvalidRuleError`] instead of failing
//! somewhere inside date arithmetic.
//!
//! # Usage
//! ```rust,ignore
//! use hubtasks_core::recurrence::RecurrenceRule;
//!
//! let rule = RecurrenceRule::parse(r#"{"frequency": "monthly", "interval": 1}"#)?;
//! let next = rule.next_occurrence(due_at, task.occurrence_index)?;
//! ```

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidRuleError;

/// Unit a recurrence advances by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = InvalidRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(InvalidRuleError::UnknownFrequency(s.to_string())),
        }
    }
}

/// How a task repeats.
///
/// Fields are public so callers can build rules directly; every date
/// computation re-validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecurrenceRule", into = "RawRecurrenceRule")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Number of frequency units between occurrences (>= 1)
    pub interval: u32,
    /// Total occurrences in the series, the first one included
    pub count: Option<u32>,
    /// Last date (inclusive) an occurrence may fall on
    pub until: Option<NaiveDate>,
    /// Weekly only: restrict occurrences to these weekdays
    pub by_weekday: Option<Vec<Weekday>>,
}

/// Untyped rule document as stored by the surrounding form.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRecurrenceRule {
    frequency: String,
    #[serde(default = "default_interval")]
    interval: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    by_weekday: Option<Vec<String>>,
}

fn default_interval() -> i64 {
    1
}

impl TryFrom<RawRecurrenceRule> for RecurrenceRule {
    type Error = InvalidRuleError;

    fn try_from(raw: RawRecurrenceRule) -> Result<Self, Self::Error> {
        let frequency: Frequency = raw.frequency.parse()?;

        let interval = u32::try_from(raw.interval)
            .ok()
            .filter(|i| *i >= 1)
            .ok_or(InvalidRuleError::NonPositiveInterval(raw.interval))?;

        let count = match raw.count {
            Some(c) => Some(
                u32::try_from(c)
                    .ok()
                    .filter(|c| *c >= 1)
                    .ok_or(InvalidRuleError::NonPositiveCount(c))?,
            ),
            None => None,
        };

        let by_weekday = match raw.by_weekday {
            Some(names) if !names.is_empty() => Some(
                names
                    .iter()
                    .map(|name| {
                        name.parse::<Weekday>()
                            .map_err(|_| InvalidRuleError::UnknownWeekday(name.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => None,
        };

        let rule = RecurrenceRule {
            frequency,
            interval,
            count,
            until: raw.until,
            by_weekday,
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl From<RecurrenceRule> for RawRecurrenceRule {
    fn from(rule: RecurrenceRule) -> Self {
        RawRecurrenceRule {
            frequency: rule.frequency.as_str().to_string(),
            interval: rule.interval as i64,
            count: rule.count.map(i64::from),
            until: rule.until,
            by_weekday: rule
                .by_weekday
                .map(|days| days.iter().map(|d| weekday_name(*d).to_string()).collect()),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
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

impl RecurrenceRule {
    /// Create a rule with no count, until or weekday filter.
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            count: None,
            until: None,
            by_weekday: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_weekdays(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.by_weekday = Some(days.into_iter().collect());
        self
    }

    /// Parse a JSON rule document.
    pub fn parse(json: &str) -> Result<Self, InvalidRuleError> {
        let raw: RawRecurrenceRule =
            serde_json::from_str(json).map_err(|e| InvalidRuleError::Malformed(e.to_string()))?;
        raw.try_into()
    }

    /// Check the rule can drive date arithmetic.
    pub fn validate(&self) -> Result<(), InvalidRuleError> {
        if self.interval < 1 {
            return Err(InvalidRuleError::NonPositiveInterval(self.interval as i64));
        }
        if self.count == Some(0) {
            return Err(InvalidRuleError::NonPositiveCount(0));
        }
        if !self.weekdays().is_empty() && self.frequency != Frequency::Weekly {
            return Err(InvalidRuleError::WeekdaysRequireWeekly(self.frequency));
        }
        Ok(())
    }

    /// Weekday filter, empty when unset.
    pub fn weekdays(&self) -> &[Weekday] {
        self.by_weekday.as_deref().unwrap_or(&[])
    }

    /// Next due date after `last_due_at`.
    ///
    /// `occurrence_index` is the 1-based position of the occurrence due at
    /// `last_due_at`. Returns `Ok(None)` once the series is exhausted: the
    /// index has reached `count`, or the computed date falls after `until`.
    pub fn next_occurrence(
        &self,
        last_due_at: DateTime<Utc>,
        occurrence_index: u32,
    ) -> Result<Option<DateTime<Utc>>, InvalidRuleError> {
        self.validate()?;

        if let Some(count) = self.count {
            if occurrence_index >= count {
                return Ok(None);
            }
        }

        let interval = self.interval as i64;
        let next = match self.frequency {
            Frequency::Daily => last_due_at.checked_add_signed(Duration::days(interval)),
            Frequency::Weekly if self.weekdays().is_empty() => {
                last_due_at.checked_add_signed(Duration::weeks(interval))
            }
            Frequency::Weekly => self.next_matching_weekday(last_due_at),
            // chrono clamps to the last day of a shorter month
            Frequency::Monthly => last_due_at.checked_add_months(Months::new(self.interval)),
        };

        let Some(next) = next else {
            return Ok(None);
        };

        if let Some(until) = self.until {
            if next.date_naive() > until {
                return Ok(None);
            }
        }

        Ok(Some(next))
    }

    /// Earliest day strictly after `last` whose weekday is in the filter,
    /// staying on weeks that are a multiple of `interval` away from the
    /// week of `last`.
    ///
    /// Only two weeks are scanned: the rest of the week of `last`, then the
    /// week `interval` weeks later.
    fn next_matching_weekday(&self, last: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = self.weekdays();
        let into_week = last.weekday().num_days_from_monday() as i64;
        let next_week = 7 * self.interval as i64 - into_week;

        (1..7 - into_week)
            .chain(next_week..next_week + 7)
            .map_while(|offset| last.checked_add_signed(Duration::days(offset)))
            .find(|candidate| days.contains(&candidate.weekday()))
    }

    /// Every occurrence of the series starting at `first_due_at` (included).
    ///
    /// Unbounded when the rule has neither `count` nor `until`.
    pub fn occurrences(
        &self,
        first_due_at: DateTime<Utc>,
    ) -> Result<Occurrences<'_>, InvalidRuleError> {
        self.validate()?;
        let within_until = self
            .until
            .map_or(true, |until| first_due_at.date_naive() <= until);
        Ok(Occurrences {
            rule: self,
            next: within_until.then_some(first_due_at),
            index: 1,
        })
    }
}

/// Iterator over a recurrence series. See [`RecurrenceRule::occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    next: Option<DateTime<Utc>>,
    index: u32,
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        // The rule was validated when the iterator was built
        self.next = self
            .rule
            .next_occurrence(current, self.index)
            .ok()
            .flatten();
        self.index = self.index.saturating_add(1);
        Some(current)
    }
}
