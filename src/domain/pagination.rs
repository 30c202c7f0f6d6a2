//! Pagination state as read from the rendered review widget.
//!
//! The state is derived fresh every crawl iteration and never cached across
//! navigations: the host page re-renders the pagination controls on its own
//! schedule.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Page marked as current, if any marker was rendered.
    pub current_page: Option<u32>,

    /// Highest visible page-number control. A lower bound on the real total
    /// when the control list is windowed.
    pub total_pages: Option<u32>,

    /// True when the next control is missing or disabled in any form.
    pub next_disabled: bool,
}

impl PaginationState {
    /// Both page signals are known and the current page has reached the
    /// visible total.
    pub fn on_last_visible_page(&self) -> bool {
        matches!(
            (self.current_page, self.total_pages),
            (Some(current), Some(total)) if current >= total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_visible_page() {
        let state = PaginationState {
            current_page: Some(3),
            total_pages: Some(3),
            next_disabled: false,
        };
        assert!(state.on_last_visible_page());

        let state = PaginationState {
            current_page: Some(2),
            total_pages: Some(3),
            next_disabled: false,
        };
        assert!(!state.on_last_visible_page());
    }

    #[test]
    fn unknown_signals_never_mean_last_page() {
        let state = PaginationState {
            current_page: Some(7),
            total_pages: None,
            next_disabled: false,
        };
        assert!(!state.on_last_visible_page());
        assert!(!PaginationState::default().on_last_visible_page());
    }
}
