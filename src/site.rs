//! Page-level navigation decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Page scripts call these to decide where a visitor should land: public
//! pages bounce to the maintenance page while maintenance is on, the admin
//! login and dashboard guard each other, and `.html` suffixes are hidden
//! from the address bar. All functions are pure; the caller performs the
//! actual navigation or history rewrite.

pub const MAINTENANCE_PAGE: &str = "maintenance.html";
pub const LOGIN_PAGE: &str = "login.html";
pub const DASHBOARD_PAGE: &str = "dashboard.html";
/// Where logout sends the visitor.
pub const LOGOUT_REDIRECT: &str = LOGIN_PAGE;

const ADMIN_SEGMENT: &str = "/admin/";
const HTML_SUFFIX: &str = ".html";

#[must_use]
pub fn is_admin_path(path: &str) -> bool {
    path.contains(ADMIN_SEGMENT)
}

/// Redirect target for a public page while maintenance mode is on.
///
/// Admin pages and the maintenance page itself are never redirected.
#[must_use]
pub fn maintenance_redirect(path: &str, maintenance_on: bool) -> Option<&'static str> {
    if !maintenance_on || is_admin_path(path) || path.contains(MAINTENANCE_PAGE) {
        return None;
    }
    Some(MAINTENANCE_PAGE)
}

/// The login page forwards visitors who are already logged in.
#[must_use]
pub fn login_page_redirect(logged_in: bool) -> Option<&'static str> {
    logged_in.then_some(DASHBOARD_PAGE)
}

/// The dashboard sends anonymous visitors back to login.
#[must_use]
pub fn dashboard_redirect(logged_in: bool) -> Option<&'static str> {
    (!logged_in).then_some(LOGIN_PAGE)
}

/// Address-bar form of a page URL with its `.html` suffix removed.
///
/// Returns `None` when nothing should be rewritten: admin pages and paths
/// without the suffix keep their URL.
#[must_use]
pub fn clean_url(path: &str, search: &str, hash: &str) -> Option<String> {
    if is_admin_path(path) {
        return None;
    }
    let stripped = path.strip_suffix(HTML_SUFFIX)?;
    let clean = if stripped.is_empty() { "/" } else { stripped };
    Some(format!("{clean}{search}{hash}"))
}

/// Whether a clicked link is a same-site page navigation eligible for
/// address-bar cleanup.
#[must_use]
pub fn should_rewrite_link(href: &str, target: Option<&str>, link_host: &str, page_host: &str) -> bool {
    if href.is_empty() {
        return false;
    }
    if ["mailto:", "tel:", "javascript:"].iter().any(|scheme| href.contains(scheme)) {
        return false;
    }
    if target.is_some_and(|t| !t.is_empty()) {
        return false;
    }
    link_host == page_host
}

#[cfg(test)]
#[path = "site_test.rs"]
mod tests;
