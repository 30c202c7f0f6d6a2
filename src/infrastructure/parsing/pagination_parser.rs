//! Pagination widget reader.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::ContextualParser;
use super::selectors::CompiledSelectors;
use super::text::parse_page_number;
use crate::domain::PaginationState;

const SKIPPED_CONTROL_CLASSES: [&str; 2] = ["prev", "next"];

/// Reads current page, visible total and next-control state from a snapshot.
///
/// Absent or unparsable markers yield `None`; an absent next control counts
/// as disabled.
#[derive(Debug, Clone)]
pub struct PaginationParser {
    selectors: CompiledSelectors,
}

impl PaginationParser {
    pub fn new(selectors: CompiledSelectors) -> Self {
        Self { selectors }
    }

    pub fn read(&self, html: &Html) -> PaginationState {
        let current_page = self
            .selectors
            .current_page
            .first_in_document(html)
            .and_then(|el| parse_page_number(&el.text().collect::<String>()));

        let total_pages = self
            .selectors
            .page_controls
            .all_in_document(html)
            .into_iter()
            .filter(|control| !is_step_control(*control))
            .filter_map(|control| parse_page_number(&control.text().collect::<String>()))
            .max();

        let next_disabled = self
            .selectors
            .next_control
            .first_in_document(html)
            .is_none_or(is_disabled);

        let state = PaginationState {
            current_page,
            total_pages,
            next_disabled,
        };
        debug!(
            "Pagination: current={:?} total={:?} next_disabled={}",
            state.current_page, state.total_pages, state.next_disabled
        );
        state
    }
}

impl ContextualParser for PaginationParser {
    type Output = PaginationState;
    type Context = ();

    fn parse_with_context(&self, html: &Html, _context: &Self::Context) -> Self::Output {
        self.read(html)
    }
}

fn is_step_control(control: ElementRef<'_>) -> bool {
    control
        .value()
        .classes()
        .any(|class| SKIPPED_CONTROL_CLASSES.contains(&class))
}

fn is_disabled(control: ElementRef<'_>) -> bool {
    let element = control.value();
    element.attr("disabled").is_some()
        || element.classes().any(|class| class == "disabled")
        || element
            .attr("aria-disabled")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}
