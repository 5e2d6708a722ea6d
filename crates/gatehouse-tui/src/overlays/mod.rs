//! Modal overlays drawn over the active page.

mod identity_menu;

pub use identity_menu::IdentityMenuState;

use crate::effects::UiEffect;
use crate::router::Route;

#[derive(Debug)]
pub enum Overlay {
    IdentityMenu(IdentityMenuState),
}

/// What an overlay wants done after handling a key.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    CloseAndNavigate(Route),
}

impl OverlayUpdate {
    pub fn stay() -> Self {
        Self {
            transition: OverlayTransition::Stay,
            effects: vec![],
        }
    }

    pub fn close() -> Self {
        Self {
            transition: OverlayTransition::Close,
            effects: vec![],
        }
    }

    pub fn close_with(effects: Vec<UiEffect>) -> Self {
        Self {
            transition: OverlayTransition::Close,
            effects,
        }
    }

    pub fn close_and_navigate(to: Route) -> Self {
        Self {
            transition: OverlayTransition::CloseAndNavigate(to),
            effects: vec![],
        }
    }
}
