//! Date ranges - a begin and an end date edited as one field.
//!
//! The value is `begin-end`, both halves in the dates' storage format. The
//! range is valid only while both dates are, and writes are split back
//! onto the two date nodes.

use chrono::{Datelike, Local, NaiveDate, TimeDelta};
use tracing::debug;

use super::text::{MAX_YEAR, MIN_YEAR};
use super::{DateParams, NodeKind, UiNode, UiProps};

/// Separates the begin and end date inside a range value.
pub(super) const RANGE_SEPARATOR: &str = "-";

pub(super) struct RangeState {
    pub(super) begin: UiNode,
    pub(super) end: UiNode,
    params: DateParams,
}

impl RangeState {
    pub(super) fn is_valid(&self) -> bool {
        self.begin.is_valid() && self.end.is_valid()
    }

    pub(super) fn project(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!("{}{RANGE_SEPARATOR}{}", self.begin.value(), self.end.value())
    }

    pub(super) fn output(&self) -> String {
        format!("{}{RANGE_SEPARATOR}{}", self.begin.output(), self.end.output())
    }

    pub(super) fn write(&self, value: &str) {
        let (begin, end) = self.split(value);
        self.begin.set_value(begin);
        self.end.set_value(end);
    }

    /// Split at the first separator that leaves two parseable dates, else
    /// at the first separator. Without one the whole value is the begin.
    fn split<'a>(&self, value: &'a str) -> (&'a str, &'a str) {
        let parses = |s: &str| NaiveDate::parse_from_str(s, &self.params.value_format).is_ok();

        let mut first = None;
        for (at, _) in value.match_indices(RANGE_SEPARATOR) {
            let begin = &value[..at];
            let end = &value[at + RANGE_SEPARATOR.len()..];
            if parses(begin) && parses(end) {
                return (begin, end);
            }
            first.get_or_insert((begin, end));
        }
        first.unwrap_or((value, ""))
    }
}

impl UiNode {
    /// Begin/end date pair edited as one field.
    pub fn date_range(props: UiProps, params: DateParams) -> Self {
        let begin = UiNode::date_with(UiProps::default(), params.clone());
        let end = UiNode::date_with(UiProps::default(), params.clone());

        let node = UiNode::build(
            props,
            NodeKind::DateRange(RangeState {
                begin: begin.clone(),
                end: end.clone(),
                params,
            }),
        );
        node.adopt(&begin);
        node.adopt(&end);
        node
    }

    fn range_state(&self) -> Option<&RangeState> {
        match &self.inner.kind {
            NodeKind::DateRange(range) => Some(range),
            _ => None,
        }
    }

    pub fn range_begin(&self) -> Option<UiNode> {
        self.range_state().map(|r| r.begin.clone())
    }

    pub fn range_end(&self) -> Option<UiNode> {
        self.range_state().map(|r| r.end.clone())
    }

    /// Both dates, `None` while the range is invalid or unparseable.
    pub fn range_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let range = self.range_state()?;
        Some((range.begin.parsed_date()?, range.end.parsed_date()?))
    }

    pub fn set_date_range(&self, begin: NaiveDate, end: NaiveDate) -> &Self {
        let Some(range) = self.range_state() else {
            debug!(node = %self.name(), kind = ?self.kind(), "set_date_range ignored: not a date range");
            return self;
        };
        range.begin.set_date(begin);
        range.end.set_date(end);
        self
    }

    pub fn set_today_range(&self) -> &Self {
        let today = Local::now().date_naive();
        self.set_date_range(today, today)
    }

    /// Move both dates by `days` (negative moves backward). Ignored while
    /// the range is unavailable or invalid.
    pub fn shift_range(&self, days: i64) -> &Self {
        if !self.is_available() || !self.is_valid() {
            debug!(node = %self.name(), "range shift ignored: unavailable or invalid");
            return self;
        }
        let shifted = self
            .range_dates()
            .zip(TimeDelta::try_days(days))
            .and_then(|((begin, end), delta)| {
                Some((begin.checked_add_signed(delta)?, end.checked_add_signed(delta)?))
            })
            .filter(|(begin, end)| {
                let years = MIN_YEAR..=MAX_YEAR;
                years.contains(&begin.year()) && years.contains(&end.year())
            });

        match shifted {
            Some((begin, end)) => self.set_date_range(begin, end),
            None => {
                debug!(node = %self.name(), days, "range shift ignored");
                self
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payload;
    use crate::ui::UiKind;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stay() -> UiNode {
        UiNode::date_range(UiProps::new("Stay", "STAY"), DateParams::default())
    }

    #[test]
    fn test_range_value_needs_both_dates() {
        let range = stay();
        assert_eq!(range.kind(), UiKind::DateRange);
        assert!(!range.is_valid());

        range.set_value("2024/03/01-2024/03/05");
        assert!(range.is_valid());
        assert_eq!(range.value(), "2024/03/01-2024/03/05");
        assert_eq!(range.range_dates(), Some((day(2024, 3, 1), day(2024, 3, 5))));

        range.range_end().unwrap().set_value("");
        assert!(!range.is_valid());
        assert_eq!(range.value(), "");
        assert_eq!(range.output(), "");
        assert_eq!(range.range_dates(), None);

        // Forcing validity is ignored
        range.validate();
        assert!(!range.is_valid());
    }

    #[test]
    fn test_range_split_prefers_parseable_halves() {
        let range = UiNode::date_range(
            UiProps::new("Stay", "STAY"),
            DateParams {
                value_format: "%Y-%m-%d".to_string(),
                output_format: "%d.%m.%Y".to_string(),
            },
        );
        range.set_value("2024-03-01-2024-03-05");

        assert_eq!(range.range_begin().unwrap().value(), "2024-03-01");
        assert_eq!(range.range_end().unwrap().value(), "2024-03-05");
        assert_eq!(range.output(), "01.03.2024-05.03.2024");
    }

    #[test]
    fn test_shift_range() {
        let range = stay();
        range.set_date_range(day(2024, 2, 27), day(2024, 3, 1));

        range.shift_range(2);
        assert_eq!(range.value(), "2024/02/29-2024/03/03");

        range.shift_range(-29);
        assert_eq!(range.value(), "2024/01/31-2024/02/03");

        range.disable();
        range.shift_range(1);
        assert_eq!(range.value(), "2024/01/31-2024/02/03");
    }

    #[test]
    fn test_reset_and_restrictions_reach_both_dates() {
        let range = UiNode::date_range(
            UiProps {
                read_only: true,
                ..UiProps::new("Stay", "STAY")
            },
            DateParams::default(),
        );
        assert!(!range.range_begin().unwrap().is_writable());
        assert!(!range.range_end().unwrap().is_writable());

        range.set_value("2024/03/01-2024/03/05");
        range.clear();
        assert!(range.is_valid());

        range.reset();
        assert!(!range.is_valid());
        assert!(!range.range_begin().unwrap().is_valid());
    }

    #[test]
    fn test_range_round_trips_through_payload() {
        let source = stay();
        source.set_date_range(day(2024, 12, 30), day(2025, 1, 2));

        let mut payload = Payload::new();
        source.export_data(&mut payload);
        assert_eq!(
            payload.get("STAY"),
            Some(&["2024/12/30-2025/01/02".to_string()][..])
        );

        let target = stay();
        target.import_data(&payload);
        assert_eq!(target.range_dates(), Some((day(2024, 12, 30), day(2025, 1, 2))));
    }
}
