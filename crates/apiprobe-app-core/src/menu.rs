// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative menu commands, kept independent of whatever renders them.

/// Route of the service-selection screen.
pub const SERVICE_SELECT_ROUTE: &str = "/login";

/// Port for changing the current route; owned by the surrounding UI.
pub trait Navigator {
    /// Navigate to `route`.
    fn go_to(&self, route: &str);
}

/// One renderable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem<A> {
    /// Stable key for the renderer.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// What selecting the entry does.
    pub action: A,
}

/// Actions reachable from the header dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    /// Open the configuration dialog.
    UpdateConfig,
    /// Go back and pick another service description.
    ReselectService,
}

/// What the host must do after a header action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEffect {
    /// Show the configuration dialog.
    OpenConfigDialog,
    /// Navigation already happened.
    Navigated,
}

/// Header dropdown entries in display order.
pub fn header_menu() -> Vec<MenuItem<HeaderAction>> {
    vec![
        MenuItem {
            id: "0",
            label: "update config",
            action: HeaderAction::UpdateConfig,
        },
        MenuItem {
            id: "1",
            label: "reselect service",
            action: HeaderAction::ReselectService,
        },
    ]
}

impl HeaderAction {
    /// Run the action. Dialog presentation is left to the host.
    pub fn run(self, navigator: &dyn Navigator) -> HeaderEffect {
        match self {
            Self::UpdateConfig => HeaderEffect::OpenConfigDialog,
            Self::ReselectService => {
                navigator.go_to(SERVICE_SELECT_ROUTE);
                HeaderEffect::Navigated
            }
        }
    }
}
