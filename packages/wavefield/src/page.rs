//! Page shell: routes, page content and navigation.
//!
//! Pages are data. The host draws the copy, buttons and cards; this module
//! decides what they say and where each action leads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::controls::ControlAction;

/// A routable page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Landing,
    Explore,
}

impl Page {
    pub fn route(&self) -> &'static str {
        match self {
            Page::Landing => "/",
            Page::Explore => "/explore",
        }
    }

    /// Resolve a route path. Trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Page> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Page::Landing),
            "/explore" => Some(Page::Explore),
            _ => None,
        }
    }

    /// Whether the page exposes the control panel.
    pub fn has_controls(&self) -> bool {
        matches!(self, Page::Explore)
    }

    pub fn content(&self) -> PageContent {
        match self {
            Page::Landing => landing_content(),
            Page::Explore => explore_content(),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Landing => write!(f, "landing"),
            Page::Explore => write!(f, "explore"),
        }
    }
}

impl FromStr for Page {
    type Err = anyhow::Error;

    /// Accepts a page name (`landing`, `explore`) or a route (`/`, `/explore`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landing" | "home" => Ok(Page::Landing),
            "explore" => Ok(Page::Explore),
            other => Page::from_path(other).ok_or_else(|| anyhow::anyhow!("Unknown page '{}'", s)),
        }
    }
}

/// What pressing an action does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionTarget {
    /// Ask the navigator to open `route`.
    Navigate { route: &'static str },
    TogglePlayback,
    Reset,
    /// Rendered but does nothing.
    None,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageAction {
    pub label: &'static str,
    pub target: ActionTarget,
}

impl PageAction {
    /// The control panel action this button performs, if any.
    pub fn control_action(&self) -> Option<ControlAction> {
        match self.target {
            ActionTarget::TogglePlayback => Some(ControlAction::TogglePlaying),
            ActionTarget::Reset => Some(ControlAction::Reset),
            ActionTarget::Navigate { .. } | ActionTarget::None => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub body: &'static str,
}

/// Static content of a page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageContent {
    pub page: Page,
    pub route: &'static str,
    pub heading: &'static str,
    pub tagline: &'static str,
    pub actions: Vec<PageAction>,
    pub cards: Vec<FeatureCard>,
    /// Gesture hints shown beside the scene.
    pub info: Vec<&'static str>,
}

impl PageContent {
    pub fn action(&self, label: &str) -> Option<&PageAction> {
        self.actions.iter().find(|a| a.label == label)
    }
}

fn landing_content() -> PageContent {
    PageContent {
        page: Page::Landing,
        route: Page::Landing.route(),
        heading: "Wave Canvas Magic",
        tagline: "Experience interactive fluid dynamics with beautiful wave patterns \
                  that respond to your every movement",
        actions: vec![
            PageAction {
                label: "Explore Waves",
                target: ActionTarget::Navigate {
                    route: Page::Explore.route(),
                },
            },
            PageAction {
                label: "Learn More",
                target: ActionTarget::None,
            },
        ],
        cards: vec![
            FeatureCard {
                title: "Interactive",
                body: "Waves respond dynamically to mouse movement and touch",
            },
            FeatureCard {
                title: "Fluid Motion",
                body: "Smooth physics-based animations using simplex noise",
            },
            FeatureCard {
                title: "Visual Beauty",
                body: "Stunning generative art that's unique every time",
            },
        ],
        info: Vec::new(),
    }
}

fn explore_content() -> PageContent {
    PageContent {
        page: Page::Explore,
        route: Page::Explore.route(),
        heading: "Wave Explorer",
        tagline: "Adjust the parameters to shape the waves.",
        actions: vec![
            PageAction {
                label: "Back to Home",
                target: ActionTarget::Navigate {
                    route: Page::Landing.route(),
                },
            },
            PageAction {
                label: "Play/Pause",
                target: ActionTarget::TogglePlayback,
            },
            PageAction {
                label: "Reset",
                target: ActionTarget::Reset,
            },
        ],
        cards: vec![
            FeatureCard {
                title: "Amplitude",
                body: "Height of the waves.",
            },
            FeatureCard {
                title: "Frequency",
                body: "How tightly the waves are packed.",
            },
            FeatureCard {
                title: "Speed",
                body: "How fast the waves travel.",
            },
            FeatureCard {
                title: "Particles",
                body: "Toggle the sparkle particles.",
            },
        ],
        info: vec![
            "Drag to rotate the view",
            "Scroll to zoom in/out",
            "Use sliders to control wave properties",
            "Toggle particles and playback",
        ],
    }
}

/// Receives navigation requests from page actions.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Navigator that records the current route; used by the native window and
/// the offline tools.
#[derive(Debug, Default)]
pub struct RouteNavigator {
    current: Page,
    history: Vec<&'static str>,
}

impl RouteNavigator {
    pub fn new(start: Page) -> Self {
        Self {
            current: start,
            history: vec![start.route()],
        }
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn history(&self) -> &[&'static str] {
        &self.history
    }
}

impl Navigator for RouteNavigator {
    fn navigate(&mut self, path: &str) {
        match Page::from_path(path) {
            Some(page) => {
                log::info!("Navigating to {}", page.route());
                self.current = page;
                self.history.push(page.route());
            }
            None => log::warn!("Ignoring navigation to unknown route '{}'", path),
        }
    }
}

/// Trigger `action` on `navigator`. Returns true if a navigation was requested.
pub fn follow_action(action: &PageAction, navigator: &mut dyn Navigator) -> bool {
    match action.target {
        ActionTarget::Navigate { route } => {
            navigator.navigate(route);
            true
        }
        _ => false,
    }
}
