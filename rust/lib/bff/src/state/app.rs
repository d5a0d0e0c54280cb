use serde::Serialize;

/// Current location, e.g. `/products/edit/4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppRoute(pub String);

impl AppRoute {
    pub const PATH: &'static str = "app/route";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A dismissible toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

/// Toasts currently on screen, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notifications(pub Vec<Notification>);

impl Notifications {
    pub const PATH: &'static str = "app/notifications";

    pub fn push(&mut self, severity: Severity, summary: &str, detail: &str) -> u64 {
        let id = self.0.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        self.0.push(Notification {
            id,
            severity,
            summary: summary.to_string(),
            detail: detail.to_string(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.0.len();
        self.0.retain(|n| n.id != id);
        self.0.len() < before
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.0.last()
    }
}
