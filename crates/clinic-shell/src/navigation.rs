//! Top-level views and the navigation capability used by shortcuts.

use std::fmt;

use clinic_shell_core::HandlerResult;
use serde::{Deserialize, Serialize};

/// A top-level view of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Dashboard,
    Patients,
    Visits,
    Transcripts,
    AiAgent,
}

impl Route {
    /// All routes in menu order.
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Patients,
        Self::Visits,
        Self::Transcripts,
        Self::AiAgent,
    ];

    /// URL path of the view.
    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Patients => "/patients",
            Self::Visits => "/visits",
            Self::Transcripts => "/transcripts",
            Self::AiAgent => "/ai-agent",
        }
    }

    /// Route for a URL path, if any.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Moves the UI to a top-level view.
///
/// Implemented by the host's router. Closures taking a [`Route`] implement
/// it too:
///
/// ```
/// use clinic_shell::HandlerResult;
/// use clinic_shell::navigation::{Navigator, Route};
///
/// let navigator = |route: Route| -> HandlerResult {
///     println!("navigating to {route}");
///     Ok(())
/// };
/// navigator.navigate(Route::Visits).unwrap();
/// ```
pub trait Navigator: Send + Sync {
    /// Navigate to `route`.
    fn navigate(&self, route: Route) -> HandlerResult;
}

impl<F> Navigator for F
where
    F: Fn(Route) -> HandlerResult + Send + Sync,
{
    fn navigate(&self, route: Route) -> HandlerResult {
        self(route)
    }
}
