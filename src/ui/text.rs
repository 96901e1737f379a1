//! Text and date behaviour.
//!
//! Lengths are measured in grapheme clusters so that wire segments and
//! `max_length` never split a user-perceived character.

use chrono::{Datelike, Local, Months, NaiveDate, TimeDelta};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::{DateParams, NodeKind, UiNode};

/// Valid year range for date shifting.
pub(super) const MIN_YEAR: i32 = 1970;
pub(super) const MAX_YEAR: i32 = 9999;

/// Split `value` into chunks of at most `size` grapheme clusters.
///
/// An empty value still yields one empty segment.
pub(super) fn chunk_segments(value: &str, size: usize) -> Vec<String> {
    if value.is_empty() || size == 0 {
        return vec![value.to_string()];
    }

    let graphemes: Vec<&str> = value.graphemes(true).collect();
    graphemes.chunks(size).map(|chunk| chunk.concat()).collect()
}

/// Reformat a stored date for display. Unparseable values pass through.
pub(super) fn format_date(value: &str, params: &DateParams) -> String {
    match NaiveDate::parse_from_str(value, &params.value_format) {
        Ok(date) => date.format(&params.output_format).to_string(),
        Err(err) => {
            debug!(value, %err, "date value does not match its storage format");
            value.to_string()
        }
    }
}

impl UiNode {
    // =========================================================================
    // Text
    // =========================================================================

    pub fn max_length(&self) -> Option<usize> {
        match &self.inner.kind {
            NodeKind::Text(params) => params.max_length.filter(|max| *max > 0),
            _ => None,
        }
    }

    /// Number of grapheme clusters beyond `max_length` (0 when unlimited).
    pub fn over_length(&self) -> usize {
        let Some(max) = self.max_length() else {
            return 0;
        };
        self.value().graphemes(true).count().saturating_sub(max)
    }

    // =========================================================================
    // Date
    // =========================================================================

    fn date_params(&self) -> Option<&DateParams> {
        match &self.inner.kind {
            NodeKind::Date(params) => Some(params),
            _ => None,
        }
    }

    /// Parsed date, `None` while invalid or unparseable.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let params = self.date_params()?;
        if !self.is_valid() {
            return None;
        }
        NaiveDate::parse_from_str(&self.value(), &params.value_format).ok()
    }

    /// Store `date` in the canonical value format.
    pub fn set_date(&self, date: NaiveDate) -> &Self {
        let Some(params) = self.date_params() else {
            debug!(node = %self.name(), kind = ?self.kind(), "set_date ignored: not a date node");
            return self;
        };
        let value = date.format(&params.value_format).to_string();
        self.set_value(value)
    }

    pub fn set_today(&self) -> &Self {
        self.set_date(Local::now().date_naive())
    }

    pub fn shift_days(&self, days: i64) -> &Self {
        let shifted = self
            .parsed_date()
            .zip(TimeDelta::try_days(days))
            .and_then(|(d, delta)| d.checked_add_signed(delta));
        self.apply_shift(shifted)
    }

    pub fn shift_months(&self, months: i32) -> &Self {
        let shifted = self.parsed_date().and_then(|d| {
            if months >= 0 {
                d.checked_add_months(Months::new(months.unsigned_abs()))
            } else {
                d.checked_sub_months(Months::new(months.unsigned_abs()))
            }
        });
        self.apply_shift(shifted)
    }

    pub fn shift_years(&self, years: i32) -> &Self {
        match years.checked_mul(12) {
            Some(months) => self.shift_months(months),
            None => self,
        }
    }

    fn apply_shift(&self, shifted: Option<NaiveDate>) -> &Self {
        match shifted {
            Some(date) if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) => self.set_date(date),
            _ => {
                debug!(node = %self.name(), "date shift ignored");
                self
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
