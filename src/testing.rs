//! Scripted stand-in for the addon, for tests.
//!
//! `FakeAddon` implements [`SimLink`] and answers variable writes the way the
//! addon does: by rewriting a real menu file on disk. Everything above the
//! link runs unmodified against it.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use crate::config::Config;
use crate::menu::{MenuReader, Navigator, is_next_marker};
use crate::sim::{MENU_CHOICE, MENU_OPEN, MENU_REFRESH, SIM_ON_GROUND, SimError, SimLink};

/// A config with every sleep removed.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.timing.sleep_short_ms = 0;
    config.timing.sleep_long_ms = 0;
    config.timing.change_poll_ms = 0;
    config.timing.read_retry_ms = 0;
    config.timing.assignment_retry_ms = 0;
    config.timing.ground_check_ms = 1;
    config.timing.queue_timeout_ms = 10;
    config.attempts.menu_read = 5;
    config
}

/// A top-level menu entry and the leaf pages behind it.
struct Entry {
    label: &'static str,
    title: &'static str,
    leaves: Vec<&'static str>,
    page_size: usize,
}

impl Entry {
    fn pages(&self) -> Vec<Vec<String>> {
        let chunks: Vec<_> = self.leaves.chunks(self.page_size.max(1)).collect();
        let last = chunks.len().saturating_sub(1);
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let mut page: Vec<String> = chunk.iter().map(ToString::to_string).collect();
                if i < last {
                    page.push("Next".into());
                }
                page
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Root(usize),
    Leaf { entry: usize, page: usize },
    Action(String),
    Airline(String),
    Done,
}

struct Addon {
    path: PathBuf,
    title: &'static str,
    root_pages: Vec<Vec<&'static str>>,
    entries: Vec<Entry>,
    open: bool,
    frozen: bool,
    freeze_on: Option<String>,
    on_ground: bool,
    screen: Screen,
    entry_opens: HashMap<&'static str, usize>,
    selected: Option<String>,
    assigned: Option<(String, String)>,
}

impl Addon {
    fn render(&self) -> (String, Vec<String>) {
        match &self.screen {
            Screen::Root(page) => (
                self.title.to_string(),
                self.root_pages
                    .get(*page)
                    .map(|p| p.iter().map(ToString::to_string).collect())
                    .unwrap_or_default(),
            ),
            Screen::Leaf { entry, page } => {
                let entry = &self.entries[*entry];
                let options = entry.pages().get(*page).cloned().unwrap_or_default();
                (entry.title.to_string(), options)
            }
            Screen::Action(gate) => (
                gate.clone(),
                vec![
                    "Assign this gate".into(),
                    "Show details".into(),
                    "activate".into(),
                ],
            ),
            Screen::Airline(_) => (
                "Select operator".into(),
                vec!["Lufthansa".into(), "GSX".into(), "Condor".into()],
            ),
            Screen::Done => ("Position assigned".into(), vec!["Close".into()]),
        }
    }

    fn write_file(&self) {
        let (title, options) = self.render();
        let mut contents = title;
        for option in options {
            contents.push('\n');
            contents.push_str(&option);
        }
        contents.push('\n');
        fs::write(&self.path, contents).unwrap();
    }

    fn choose(&mut self, index: usize) {
        let (_, options) = self.render();
        let Some(option) = options.get(index).cloned() else {
            return;
        };
        let next = match &self.screen {
            Screen::Root(page) => {
                if is_next_marker(&option) {
                    Some(Screen::Root(page + 1))
                } else if option == "Previous" {
                    Some(Screen::Root(page.saturating_sub(1)))
                } else if let Some(entry) = self.entries.iter().position(|e| e.label == option) {
                    *self.entry_opens.entry(self.entries[entry].label).or_default() += 1;
                    Some(Screen::Leaf { entry, page: 0 })
                } else {
                    None
                }
            }
            Screen::Leaf { entry, page } => {
                if is_next_marker(&option) {
                    Some(Screen::Leaf {
                        entry: *entry,
                        page: page + 1,
                    })
                } else {
                    self.selected = Some(option.clone());
                    Some(Screen::Action(option))
                }
            }
            Screen::Action(gate) => (index == 0).then(|| Screen::Airline(gate.clone())),
            Screen::Airline(gate) => {
                self.assigned = Some((gate.clone(), option));
                Some(Screen::Done)
            }
            Screen::Done => {
                self.open = false;
                None
            }
        };
        if let Some(screen) = next {
            self.screen = screen;
            self.write_file();
            if self.freeze_on.as_deref() == Some(self.render().0.as_str()) {
                self.frozen = true;
            }
        }
    }
}

/// A scripted addon sharing its state between clones.
#[derive(Clone)]
pub struct FakeAddon {
    inner: Arc<Mutex<Addon>>,
    _dir: Arc<TempDir>,
}

impl FakeAddon {
    /// Stuttgart: two root pages, a paginated gate entry, remote stands, a
    /// runway entry that leads nowhere, and cargo parking on the second page.
    pub fn edds() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("menu");
        let addon = Addon {
            path,
            title: "EDDS Stuttgart - Select parking position",
            root_pages: vec![
                vec!["Gate 1-10", "Remote Stands", "Runway 25 departure", "Next"],
                vec!["Cargo Parking", "Previous"],
            ],
            entries: vec![
                Entry {
                    label: "Gate 1-10",
                    title: "Gate 1-10",
                    leaves: vec![
                        "Gate 1", "Gate 2", "Gate 3", "Gate 4", "Gate 5A", "Gate 11B", "Gate 12",
                    ],
                    page_size: 3,
                },
                Entry {
                    label: "Remote Stands",
                    title: "Remote Stands",
                    leaves: vec!["Stand 501", "Stand 502"],
                    page_size: 5,
                },
                Entry {
                    label: "Cargo Parking",
                    title: "Cargo Parking",
                    leaves: vec!["Cargo Parking 101", "Cargo Parking 102"],
                    page_size: 5,
                },
            ],
            open: false,
            frozen: false,
            freeze_on: None,
            on_ground: true,
            screen: Screen::Root(0),
            entry_opens: HashMap::new(),
            selected: None,
            assigned: None,
        };
        addon.write_file();
        Self {
            inner: Arc::new(Mutex::new(addon)),
            _dir: Arc::new(dir),
        }
    }

    pub fn menu_path(&self) -> PathBuf {
        self.inner.lock().path.clone()
    }

    /// A navigator driving this addon.
    pub fn navigator(&self, config: &Config) -> Navigator {
        let reader = MenuReader::new(self.menu_path(), config.read_policy());
        Navigator::new(Box::new(self.clone()), reader, config)
    }

    /// Stop reacting to writes.
    pub fn freeze(&self) {
        self.inner.lock().frozen = true;
    }

    /// Stop reacting to writes once a page titled `title` is shown.
    pub fn freeze_on(&self, title: &str) {
        self.inner.lock().freeze_on = Some(title.to_string());
    }

    pub fn set_on_ground(&self, on_ground: bool) {
        self.inner.lock().on_ground = on_ground;
    }

    /// Number of leaf pages behind entry `entry`.
    pub fn leaf_pages(&self, entry: usize) -> usize {
        self.inner.lock().entries[entry].pages().len()
    }

    /// How many times the top-level entry `label` was opened.
    pub fn entry_opens(&self, label: &str) -> usize {
        self.inner.lock().entry_opens.get(label).copied().unwrap_or(0)
    }

    /// The last leaf option selected.
    pub fn selected_gate(&self) -> Option<String> {
        self.inner.lock().selected.clone()
    }

    /// The position and operator of the last completed assignment.
    pub fn assigned(&self) -> Option<(String, String)> {
        self.inner.lock().assigned.clone()
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }
}

impl SimLink for FakeAddon {
    fn write(&mut self, name: &str, value: f64) -> Result<(), SimError> {
        let mut addon = self.inner.lock();
        if addon.frozen {
            return Ok(());
        }
        match name {
            MENU_OPEN if value == 0.0 => addon.open = false,
            MENU_OPEN => {
                if !addon.open {
                    addon.open = true;
                    addon.screen = Screen::Root(0);
                    addon.write_file();
                }
            }
            #[allow(clippy::float_cmp)]
            MENU_CHOICE if value == MENU_REFRESH => {
                if addon.open {
                    addon.screen = Screen::Root(0);
                    addon.write_file();
                }
            }
            MENU_CHOICE if value >= 0.0 => {
                if addon.open {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    addon.choose(value as usize);
                }
            }
            _ => {
                return Err(SimError::Variable {
                    name: name.to_string(),
                    reason: format!("unexpected value {value}"),
                });
            }
        }
        Ok(())
    }

    fn read(&mut self, name: &str) -> Result<f64, SimError> {
        let addon = self.inner.lock();
        match name {
            SIM_ON_GROUND => Ok(if addon.on_ground { 1.0 } else { 0.0 }),
            MENU_OPEN => Ok(if addon.open { 1.0 } else { 0.0 }),
            _ => Err(SimError::Variable {
                name: name.to_string(),
                reason: "unknown variable".into(),
            }),
        }
    }
}
