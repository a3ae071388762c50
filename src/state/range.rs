//! Date-range selection state
//!
//! Quick presets mirror the backend's range parameters; a custom range comes
//! from the toolbar's date pickers. The current selection projects into the
//! query string of the re-fetch request, and every fetch carries a monotonic
//! sequence number so a late-arriving stale response can be discarded.

use chrono::{Days, NaiveDate};

/// Quick-selection presets plus the custom form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Recent7,
    Recent14,
    Recent30,
    All,
    Custom,
}

impl RangePreset {
    /// Presets offered as quick-range buttons, in display order
    pub const QUICK: [RangePreset; 4] = [
        RangePreset::Recent7,
        RangePreset::Recent14,
        RangePreset::Recent30,
        RangePreset::All,
    ];

    /// Value of the `range` query parameter
    pub fn param_value(self) -> &'static str {
        match self {
            RangePreset::Recent7 => "recent-7",
            RangePreset::Recent14 => "recent-14",
            RangePreset::Recent30 => "recent-30",
            RangePreset::All => "all",
            RangePreset::Custom => "custom",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            RangePreset::Recent7 => "최근 1주",
            RangePreset::Recent14 => "최근 2주",
            RangePreset::Recent30 => "최근 1달",
            RangePreset::All => "전체",
            RangePreset::Custom => "사용자 지정",
        }
    }

    /// Window length in days; `None` for the unbounded and custom presets
    pub fn days(self) -> Option<u64> {
        match self {
            RangePreset::Recent7 => Some(7),
            RangePreset::Recent14 => Some(14),
            RangePreset::Recent30 => Some(30),
            RangePreset::All | RangePreset::Custom => None,
        }
    }

    pub fn from_parameter(parameter: &str) -> Option<Self> {
        let normalized = parameter.trim().to_ascii_lowercase();
        [
            RangePreset::Recent7,
            RangePreset::Recent14,
            RangePreset::Recent30,
            RangePreset::All,
            RangePreset::Custom,
        ]
        .into_iter()
        .find(|p| p.param_value() == normalized)
    }
}

/// The resolved range the dashboard is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelection {
    pub preset: RangePreset,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeSelection {
    /// Resolve a quick preset against today's date in the fixed zone
    pub fn preset(preset: RangePreset, today: NaiveDate) -> Self {
        match preset.days() {
            Some(days) => Self {
                preset,
                start: today.checked_sub_days(Days::new(days - 1)),
                end: Some(today),
            },
            None => Self { preset: RangePreset::All, start: None, end: None },
        }
    }

    /// Resolve a custom range: reversed bounds are swapped and the end date
    /// is clamped to today
    pub fn custom(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        let (mut start, mut end) = if end < start { (end, start) } else { (start, end) };
        if end > today {
            end = today;
        }
        if start > end {
            start = end;
        }
        Self { preset: RangePreset::Custom, start: Some(start), end: Some(end) }
    }

    /// Query-string projection of this selection, the target of the re-fetch
    /// request (and the dashboard's analogue of the browser URL)
    pub fn query_string(&self) -> String {
        match (self.preset, self.start, self.end) {
            (RangePreset::Custom, Some(start), Some(end)) => format!(
                "range=custom&startDate={}&endDate={}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            _ => format!("range={}", self.preset.param_value()),
        }
    }
}

/// Selection plus in-flight fetch bookkeeping and the custom form fields
pub struct RangeState {
    pub selection: RangeSelection,
    /// Custom form inputs backing the date pickers
    pub custom_start: NaiveDate,
    pub custom_end: NaiveDate,
    pending_seq: Option<u64>,
    next_seq: u64,
}

impl RangeState {
    /// Default selection: the most recent two weeks
    pub fn new(today: NaiveDate) -> Self {
        let selection = RangeSelection::preset(RangePreset::Recent14, today);
        let custom_start = selection.start.unwrap_or(today);
        Self {
            selection,
            custom_start,
            custom_end: today,
            pending_seq: None,
            next_seq: 1,
        }
    }

    /// Allocate the sequence number of a new fetch; it supersedes any
    /// outstanding request
    pub fn begin_fetch(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending_seq = Some(seq);
        seq
    }

    /// Whether a response with this sequence number is still wanted
    pub fn accepts(&self, seq: u64) -> bool {
        self.pending_seq == Some(seq)
    }

    pub fn finish(&mut self) {
        self.pending_seq = None;
    }

    pub fn is_fetching(&self) -> bool {
        self.pending_seq.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_preset_window_resolution() {
        let today = day(2024, 3, 10);
        let sel = RangeSelection::preset(RangePreset::Recent7, today);
        assert_eq!(sel.start, Some(day(2024, 3, 4)));
        assert_eq!(sel.end, Some(today));

        let all = RangeSelection::preset(RangePreset::All, today);
        assert_eq!(all.start, None);
        assert_eq!(all.end, None);
    }

    #[test]
    fn test_custom_swaps_reversed_bounds_and_clamps_to_today() {
        let today = day(2024, 3, 10);
        let sel = RangeSelection::custom(day(2024, 3, 8), day(2024, 3, 1), today);
        assert_eq!(sel.start, Some(day(2024, 3, 1)));
        assert_eq!(sel.end, Some(day(2024, 3, 8)));

        let clamped = RangeSelection::custom(day(2024, 3, 5), day(2024, 3, 20), today);
        assert_eq!(clamped.end, Some(today));

        let future = RangeSelection::custom(day(2024, 3, 15), day(2024, 3, 20), today);
        assert_eq!(future.start, Some(today));
        assert_eq!(future.end, Some(today));
    }

    #[test]
    fn test_query_string_projection() {
        let today = day(2024, 3, 10);
        let preset = RangeSelection::preset(RangePreset::Recent14, today);
        assert_eq!(preset.query_string(), "range=recent-14");

        let custom = RangeSelection::custom(day(2024, 3, 1), day(2024, 3, 8), today);
        assert_eq!(
            custom.query_string(),
            "range=custom&startDate=2024-03-01&endDate=2024-03-08"
        );
    }

    #[test]
    fn test_param_round_trip() {
        for preset in RangePreset::QUICK {
            assert_eq!(RangePreset::from_parameter(preset.param_value()), Some(preset));
        }
        assert_eq!(RangePreset::from_parameter("CUSTOM"), Some(RangePreset::Custom));
        assert_eq!(RangePreset::from_parameter("bogus"), None);
    }

    #[test]
    fn test_stale_sequence_rejected() {
        let mut state = RangeState::new(day(2024, 3, 10));
        assert!(!state.is_fetching());

        let first = state.begin_fetch();
        let second = state.begin_fetch();
        assert!(state.is_fetching());
        assert!(!state.accepts(first), "superseded request must be discarded");
        assert!(state.accepts(second));

        state.finish();
        assert!(!state.accepts(second));
        assert!(!state.is_fetching());
    }
}
