//! Routes and the auth guard.

use std::fmt;

/// A screen the app can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login { return_url: Option<String> },
    Register,
    Products,
    ProductNew,
    ProductEdit(i64),
    ProductDetail(i64),
}

impl Route {
    pub const HOME: &'static str = "/products";

    /// Parse a location. `/` and unknown paths land on the product list.
    pub fn parse(location: &str) -> Route {
        let (path, query) = location.split_once('?').unwrap_or((location, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Route::Login {
                return_url: query
                    .split('&')
                    .find_map(|kv| kv.strip_prefix("returnUrl="))
                    .filter(|url| !url.is_empty())
                    .map(str::to_string),
            },
            ["register"] => Route::Register,
            ["products", "new"] => Route::ProductNew,
            ["products", "edit", id] => id.parse().map(Route::ProductEdit).unwrap_or(Route::Products),
            ["products", "detail", id] => id
                .parse()
                .map(Route::ProductDetail)
                .unwrap_or(Route::Products),
            _ => Route::Products,
        }
    }

    /// Product screens need a signed-in user.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login { .. } | Route::Register)
    }

    /// Where the app actually goes when asked for `self`.
    ///
    /// Signed-out users asking for a product screen are sent to login with
    /// a return URL; signed-in users asking for login or register are sent
    /// on (to the return URL when there is one).
    pub fn guard(self, authenticated: bool) -> Route {
        match (self, authenticated) {
            (route, false) if route.requires_auth() => Route::Login {
                return_url: Some(route.to_string()),
            },
            (Route::Login { return_url }, true) => return_url
                .map(|url| Route::parse(&url))
                .filter(Route::requires_auth)
                .unwrap_or(Route::Products),
            (Route::Register, true) => Route::Products,
            (route, _) => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login { return_url: None } => f.write_str("/login"),
            Route::Login {
                return_url: Some(url),
            } => write!(f, "/login?returnUrl={}", url),
            Route::Register => f.write_str("/register"),
            Route::Products => f.write_str(Self::HOME),
            Route::ProductNew => f.write_str("/products/new"),
            Route::ProductEdit(id) => write!(f, "/products/edit/{}", id),
            Route::ProductDetail(id) => write!(f, "/products/detail/{}", id),
        }
    }
}
