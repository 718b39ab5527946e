//! Path-based access gate.
//!
//! Policy is default-deny: every path requires a session unless it appears
//! on the public allow-list. Adding a new page without touching the guard
//! therefore leaves it protected, never exposed.

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Let the request through.
    Granted,
    /// No session and the path is not public; send the user to sign-in.
    SignInRequired,
}

/// Default-deny route guard with a public allow-list.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    public: Vec<String>,
}

/// Paths reachable without a session: the landing page and the two
/// authentication entry points.
const DEFAULT_PUBLIC_PATHS: &[&str] = &["/", "/login", "/signup"];

impl Default for RouteGuard {
    fn default() -> Self {
        Self { public: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect() }
    }
}

impl RouteGuard {
    /// Guard with the default public allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a public path prefix (e.g. `/pricing`).
    #[must_use]
    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public.push(path.into());
        self
    }

    /// Whether `path` is reachable without a session.
    ///
    /// `/` matches only itself; any other allow-list entry matches itself
    /// and everything nested under it (`/login` covers `/login/reset` but
    /// not `/loginish`).
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public.iter().any(|public| {
            if public == "/" {
                path == "/"
            } else {
                path == public || path.starts_with(&format!("{public}/"))
            }
        })
    }

    /// Gate a navigation: public paths always pass; everything else needs a
    /// live session.
    pub fn check(&self, path: &str, signed_in: bool) -> Access {
        if signed_in || self.is_public_path(path) {
            Access::Granted
        } else {
            Access::SignInRequired
        }
    }
}
