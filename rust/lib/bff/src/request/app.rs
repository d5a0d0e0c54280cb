/// Start the app at `route` (defaults to `/`).
#[derive(Debug, Clone, Default)]
pub struct InitializeReq {
    pub route: Option<String>,
}

impl InitializeReq {
    pub const PATH: &'static str = "app/initialize";
}

#[derive(Debug, Clone)]
pub struct NavigateReq {
    pub route: String,
}

impl NavigateReq {
    pub const PATH: &'static str = "app/navigate";

    pub fn to(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }
}

/// Close a toast.
#[derive(Debug, Clone)]
pub struct DismissReq {
    pub id: u64,
}

impl DismissReq {
    pub const PATH: &'static str = "app/dismiss";
}
