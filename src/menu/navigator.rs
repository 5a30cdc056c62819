//! Menu navigation: select, paginate, search, replay.

use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::model::NavigationCoordinate;
use crate::retry::RetryPolicy;
use crate::sim::{MENU_CHOICE, MENU_OPEN, MENU_REFRESH, SimLink};

use super::{MenuError, MenuReader, MenuState, Result};

/// Whether the navigator is waiting for the addon to react to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    AwaitingChange,
}

/// How [`Navigator::find_and_select`] compares keywords with options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The option contains one of the keywords.
    Substring,
    /// One of the option's words equals one of the keywords.
    Keyword,
    /// Like `Substring`, but on a single-page dialog: no pagination, and the
    /// selected index is shifted back by the configured action offset.
    MenuAction,
}

impl MatchMode {
    fn matches(self, option: &str, keywords: &[&str]) -> bool {
        match self {
            Self::Keyword => option
                .split_whitespace()
                .any(|word| keywords.contains(&word)),
            Self::Substring | Self::MenuAction => keywords.iter().any(|k| option.contains(k)),
        }
    }
}

/// Drives the addon's menu through the simulator link.
///
/// Owns the link and the reader: nothing else may write menu variables while
/// a navigator exists, since the addon has no notion of a session.
pub struct Navigator {
    link: Box<dyn SimLink>,
    reader: MenuReader,
    state: NavState,
    settle: Duration,
    change_policy: RetryPolicy,
    next_policy: RetryPolicy,
    search_policy: RetryPolicy,
    action_offset: usize,
}

impl Navigator {
    pub fn new(link: Box<dyn SimLink>, reader: MenuReader, config: &Config) -> Self {
        Self {
            link,
            reader,
            state: NavState::Idle,
            settle: config.timing.sleep_short(),
            change_policy: config.change_policy(),
            next_policy: config.next_policy(),
            search_policy: config.search_policy(),
            action_offset: config.attempts.menu_action_offset,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// The last snapshot read.
    pub fn current(&self) -> &MenuState {
        self.reader.current()
    }

    /// Reads a fresh snapshot.
    pub fn read(&mut self) -> Result<MenuState> {
        self.reader.read_menu().cloned()
    }

    /// Whether the aircraft has ground contact.
    pub fn on_ground(&mut self) -> Result<bool> {
        Ok(self.link.on_ground()?)
    }

    /// Opens the menu and forces the addon to rewrite it from the root page.
    pub fn refresh(&mut self) -> Result<MenuState> {
        self.link.write(MENU_OPEN, 1.0)?;
        self.pause();
        self.link.write(MENU_CHOICE, MENU_REFRESH)?;
        self.pause();
        self.read()
    }

    /// Closes the menu.
    pub fn close(&mut self) -> Result<()> {
        self.link.write(MENU_OPEN, 0.0)?;
        self.pause();
        self.state = NavState::Idle;
        Ok(())
    }

    /// Selects option `index` and waits for the menu to change.
    ///
    /// Returns whether a change was observed within the change policy.
    pub fn select_index(&mut self, index: usize) -> Result<bool> {
        self.pause();
        let before = self.reader.current().fingerprint();
        #[allow(clippy::cast_precision_loss)]
        self.link.write(MENU_CHOICE, index as f64)?;
        self.state = NavState::AwaitingChange;
        let changed = self.wait_for_change(&before);
        self.state = NavState::Idle;
        let changed = changed?;
        if !changed {
            tracing::debug!(
                "menu did not change after selecting {index} on '{}'",
                self.reader.current().title
            );
        }
        Ok(changed)
    }

    /// Selects the current page's pagination marker.
    ///
    /// Returns `false` when the page has none, i.e. pagination has ended.
    /// A marker that never produces a change is an error.
    pub fn click_next(&mut self) -> Result<bool> {
        let Some(index) = self.reader.current().next_index() else {
            return Ok(false);
        };
        for attempt in self.next_policy.attempts() {
            tracing::debug!("selecting Next at index {index} (attempt {attempt})");
            if self.select_index(index)? {
                return Ok(true);
            }
        }
        Err(self.not_changed(index))
    }

    /// Finds an option matching `keywords` and selects it, paging forward
    /// until it turns up or the search policy runs out.
    ///
    /// Returns whether the selection changed the menu.
    pub fn find_and_select(&mut self, keywords: &[&str], mode: MatchMode) -> Result<bool> {
        self.search_and_select(keywords, mode)
            .map(|(_, changed)| changed)
    }

    /// Like [`Navigator::find_and_select`], but a selection the addon does
    /// not react to is [`MenuError::NotChanged`].
    pub fn find_and_advance(&mut self, keywords: &[&str], mode: MatchMode) -> Result<()> {
        let (index, changed) = self.search_and_select(keywords, mode)?;
        if changed { Ok(()) } else { Err(self.not_changed(index)) }
    }

    fn search_and_select(&mut self, keywords: &[&str], mode: MatchMode) -> Result<(usize, bool)> {
        tracing::debug!("looking for {keywords:?} ({mode:?})");
        let mut pages = 0;
        for attempt in self.search_policy.attempts() {
            pages = attempt;
            let menu = self.read()?;
            if let Some(index) = self.search(&menu, keywords, mode) {
                tracing::info!(
                    "found {keywords:?} at index {index}: {}",
                    menu.options.get(index).map_or("", String::as_str)
                );
                return Ok((index, self.select_index(index)?));
            }
            if mode == MatchMode::MenuAction || !self.click_next()? {
                break;
            }
        }
        Err(MenuError::OptionNotFound {
            keywords: keywords.iter().map(ToString::to_string).collect(),
            attempts: pages,
        })
    }

    /// Replays a navigation coordinate recorded while mapping.
    ///
    /// Expects the menu to be on its first root page.
    pub fn replay(&mut self, coordinate: &NavigationCoordinate) -> Result<()> {
        tracing::debug!("replaying {coordinate:?}");
        self.click_next_times(coordinate.top_level_page)?;
        self.advance(coordinate.top_level_index)?;
        self.click_next_times(coordinate.pagination_clicks)?;
        self.advance(coordinate.leaf_index)
    }

    /// Selects `index`, failing when the menu does not change.
    fn advance(&mut self, index: usize) -> Result<()> {
        if self.select_index(index)? {
            Ok(())
        } else {
            Err(self.not_changed(index))
        }
    }

    fn not_changed(&self, index: usize) -> MenuError {
        MenuError::NotChanged {
            index,
            title: self.reader.current().title.clone(),
        }
    }

    /// Refreshes the menu and pages forward to root page `page`.
    pub fn goto_top_page(&mut self, page: usize) -> Result<()> {
        self.refresh()?;
        self.pause();
        self.click_next_times(page)
    }

    fn click_next_times(&mut self, clicks: usize) -> Result<()> {
        for _ in 0..clicks {
            if !self.click_next()? {
                return Err(MenuError::PaginationEnded(
                    self.reader.current().title.clone(),
                ));
            }
        }
        Ok(())
    }

    fn search(&self, menu: &MenuState, keywords: &[&str], mode: MatchMode) -> Option<usize> {
        let index = menu
            .options
            .iter()
            .position(|option| mode.matches(option, keywords))?;
        if mode == MatchMode::MenuAction {
            index.checked_sub(self.action_offset)
        } else {
            Some(index)
        }
    }

    fn wait_for_change(&mut self, before: &str) -> Result<bool> {
        for _ in self.change_policy.attempts() {
            self.change_policy.pause();
            if self.reader.read_menu()?.fingerprint() != before {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn pause(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }
}
