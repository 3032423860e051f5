//! Pagination state for the parameter list
//!
//! Navigation is gated by the flags of the page currently on screen; the
//! client never recomputes `has_previous` / `has_next` itself.

use std::fmt;

use crate::protocol::ParameterPage;

pub const DEFAULT_PER_PAGE: u32 = 10;

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Previous => write!(f, "previous"),
            Direction::Next => write!(f, "next"),
        }
    }
}

/// Current page and page size of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl Pagination {
    pub fn new(per_page: u32) -> Self {
        Self {
            current_page: 1,
            per_page: per_page.max(1),
        }
    }

    /// Start at a given page (floored at 1)
    pub fn starting_at(page: u32, per_page: u32) -> Self {
        Self {
            current_page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Move one page in `direction` if the displayed page allows it.
    ///
    /// Returns the page to fetch, or `None` when navigation is not offered
    /// or would not change the page.
    pub fn navigate(&mut self, direction: Direction, displayed: Option<&ParameterPage>) -> Option<u32> {
        let displayed = displayed?;
        let target = match direction {
            Direction::Previous if displayed.has_previous => self.current_page.saturating_sub(1).max(1),
            Direction::Next if displayed.has_next => {
                self.current_page.saturating_add(1).min(displayed.total_pages.max(1))
            }
            _ => return None,
        };

        if target == self.current_page {
            return None;
        }
        self.current_page = target;
        Some(target)
    }

    /// Adopt the page number the server actually returned (it clamps)
    pub fn page_loaded(&mut self, page: &ParameterPage) {
        self.current_page = page.page.max(1);
    }

    /// Fall back to the page still on screen after a failed fetch
    pub fn revert(&mut self, displayed: Option<&ParameterPage>) {
        self.current_page = displayed.map(|p| p.page.max(1)).unwrap_or(1);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}
