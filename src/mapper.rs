//! Airport mapping: walk every branch of the menu once and record where
//! each gate and parking position lives.
//!
//! The walk is two levels deep. Root pages list top-level entries; each entry
//! opens a paginated list of positions. Every position is stored with the
//! [`NavigationCoordinate`] that leads back to it, so an assignment later is
//! a replay rather than a search.

mod interpret;

pub use interpret::{interpret_position, split_token};

use std::collections::HashSet;
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;

use regex::Regex;

use crate::config::Config;
use crate::menu::{
    MenuError, MenuState, Navigator, Result, is_navigation_option, is_next_marker,
};
use crate::model::{AirportInventory, Category, NavigationCoordinate, RawMap, RawPosition};

/// Pages the addon shows before it knows the airport.
const SELECT_AIRPORT: &str = "Select airport";

const GATE_TITLE_WORDS: [&str; 2] = ["Gate", "Dock"];
const PARKING_TITLE_WORDS: [&str; 4] = ["Parking", "Stand", "Remote", "Ramp"];

static ICAO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{4})\b").expect("static pattern"));

static GATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)Gate\s+([A-Z]?\s*\d+\s*[A-Z]?\b)",
        r"(?i)Dock\s+([A-Z]?\s*\d+\s*[A-Z]?\b)",
        r"(?i)^([A-Z]?\s*\d+\s*[A-Z]?)$",
        r"(?i)^([A-Z]\s*\d+)$",
    ])
});

static PARKING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(Stand\s+\w+)",
        r"(?i)(\w*\s*Parking\s+\w+)",
        r"(?i)(Remote\s+\w+)",
        r"(?i)(Ramp\s+\w+)",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static pattern"))
        .collect()
}

/// The ICAO code shown in a menu title, if any.
pub fn title_icao(title: &str) -> Option<&str> {
    ICAO.captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Checks that the menu belongs to `airport`.
///
/// A title without a recognisable code passes with a warning; the addon
/// does not always print one.
pub fn verify_airport(menu: &MenuState, airport: &str) -> Result<()> {
    match title_icao(&menu.title) {
        Some(found) if !found.eq_ignore_ascii_case(airport) => Err(MenuError::AirportMismatch {
            expected: airport.to_string(),
            found: found.to_string(),
        }),
        Some(found) => {
            tracing::debug!("airport verified: {found}");
            Ok(())
        }
        None => {
            tracing::warn!("could not find an ICAO code in menu title '{}'", menu.title);
            Ok(())
        }
    }
}

/// Which pattern family applies to a page, judged by its title.
pub fn page_category(title: &str) -> Option<Category> {
    if GATE_TITLE_WORDS.iter().any(|w| title.contains(w)) {
        Some(Category::Gate)
    } else if PARKING_TITLE_WORDS.iter().any(|w| title.contains(w)) {
        Some(Category::Parking)
    } else {
        None
    }
}

/// The position token an option names, using the patterns of `category`.
pub fn extract_token(option: &str, category: Category) -> Option<String> {
    let patterns = match category {
        Category::Gate => &*GATE_PATTERNS,
        Category::Parking => &*PARKING_PATTERNS,
    };
    patterns
        .iter()
        .find_map(|p| p.captures(option))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether a root option opens a branch worth exploring.
fn is_top_level_entry(option: &str) -> bool {
    !option.is_empty()
        && !is_next_marker(option)
        && !option.contains("Runway")
        && !option.split_whitespace().any(|w| w == "Previous")
}

/// Explores the menu of one airport.
pub struct MenuMapper<'a> {
    nav: &'a mut Navigator,
    settle: Duration,
    seen: HashSet<String>,
}

impl<'a> MenuMapper<'a> {
    pub fn new(nav: &'a mut Navigator, config: &Config) -> Self {
        Self {
            nav,
            settle: config.timing.sleep_long(),
            seen: HashSet::new(),
        }
    }

    /// Walks every root page and every entry on it, collecting positions.
    pub fn map_airport(&mut self, airport: &str) -> Result<RawMap> {
        tracing::info!("mapping parking positions for {airport}");
        self.seen.clear();
        let mut map = RawMap::new(airport.to_uppercase());

        let root = self.nav.refresh()?;
        verify_airport(&root, airport)?;

        let mut page = 0;
        loop {
            let root = self.nav.read()?;
            let entries: Vec<usize> = root
                .options
                .iter()
                .enumerate()
                .filter(|(_, o)| is_top_level_entry(o))
                .map(|(i, _)| i)
                .collect();
            tracing::debug!("root page {page}: {} entries", entries.len());
            self.log_page(&mut map, &root, 0, NavigationCoordinate::default());

            for index in entries {
                self.explore_entry(&mut map, page, index)?;
                self.nav.goto_top_page(page)?;
            }

            self.pause();
            let root = self.nav.read()?;
            if !root.has_next() {
                tracing::debug!("no more root pages after page {page}");
                break;
            }
            if !self.nav.click_next()? {
                break;
            }
            page += 1;
        }

        tracing::info!(
            "mapped {airport}: {} gate(s), {} other spot(s)",
            map.gates.len(),
            map.spots.len()
        );
        Ok(map)
    }

    fn explore_entry(&mut self, map: &mut RawMap, page: usize, index: usize) -> Result<()> {
        if !self.nav.select_index(index)? {
            tracing::debug!("root option {index} on page {page} leads nowhere");
            return Ok(());
        }
        let mut clicks = 0;
        loop {
            let menu = self.nav.read()?;
            let base = NavigationCoordinate {
                top_level_page: page,
                top_level_index: index,
                pagination_clicks: clicks,
                leaf_index: 0,
            };
            self.log_page(map, &menu, 1, base);
            if !self.nav.click_next()? {
                tracing::debug!("entry {index} on page {page}: {clicks} Next click(s)");
                return Ok(());
            }
            clicks += 1;
        }
    }

    /// Records the positions on a page the first time it is seen.
    fn log_page(
        &mut self,
        map: &mut RawMap,
        menu: &MenuState,
        depth: usize,
        base: NavigationCoordinate,
    ) {
        if menu.title == SELECT_AIRPORT {
            tracing::debug!("skipping airport selection page");
            return;
        }
        if !self.seen.insert(format!("{depth}:{}", menu.fingerprint())) || depth == 0 {
            return;
        }
        let Some(category) = page_category(&menu.title) else {
            return;
        };
        let positions = match category {
            Category::Gate => &mut map.gates,
            Category::Parking => &mut map.spots,
        };
        for (leaf_index, option) in menu.options.iter().enumerate() {
            if is_navigation_option(option) {
                continue;
            }
            let Some(token) = extract_token(option, category) else {
                continue;
            };
            if positions.contains_key(&token) {
                continue;
            }
            tracing::debug!("found {token} in '{}'", menu.title);
            positions.insert(
                token.clone(),
                RawPosition {
                    token,
                    full_text: option.clone(),
                    coordinate: NavigationCoordinate { leaf_index, ..base },
                    menu_title: menu.title.clone(),
                    depth,
                    category,
                },
            );
        }
    }

    fn pause(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }
}

impl AirportInventory {
    /// Interprets every raw position, gates first, then the other spots.
    pub fn from_raw(map: &RawMap) -> Self {
        let mut inventory = Self::new(map.airport.clone());
        for position in map.gates.values().chain(map.spots.values()) {
            inventory.insert(interpret_position(position));
        }
        inventory
    }
}
