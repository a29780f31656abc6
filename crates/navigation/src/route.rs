//! Route table and access requirements
//!
//! Routes are declared once, either in code (`RouteTable::default`) or from
//! `[[routes]]` config entries, and never change afterwards. Child routes are
//! matched as a chain below their parent, the way nested views mount inside a
//! layout.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use session_store::CredentialKind;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// User login view.
pub const LOGIN_PATH: &str = "/login";

/// Admin login view.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Query parameter carrying the destination to resume after login.
pub const REDIRECT_PARAM: &str = "redirect";

/// Access requirement declared by a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessRequirement {
    #[default]
    None,
    RequiresUser,
    RequiresAdmin,
}

impl AccessRequirement {
    /// Parse a requirement tag. Accepts the short config names and the meta
    /// flags the web router used. Returns `None` for unrecognized tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "public" => Some(AccessRequirement::None),
            "user" | "requires_user" | "requiresauth" => Some(AccessRequirement::RequiresUser),
            "admin" | "requires_admin" | "requiresadminauth" => {
                Some(AccessRequirement::RequiresAdmin)
            }
            _ => None,
        }
    }

    /// The credential that satisfies this requirement, if any.
    pub fn credential(self) -> Option<CredentialKind> {
        match self {
            AccessRequirement::None => None,
            AccessRequirement::RequiresUser => Some(CredentialKind::User),
            AccessRequirement::RequiresAdmin => Some(CredentialKind::Admin),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccessRequirement::None => "none",
            AccessRequirement::RequiresUser => "user",
            AccessRequirement::RequiresAdmin => "admin",
        }
    }
}

impl From<CredentialKind> for AccessRequirement {
    fn from(kind: CredentialKind) -> Self {
        match kind {
            CredentialKind::User => AccessRequirement::RequiresUser,
            CredentialKind::Admin => AccessRequirement::RequiresAdmin,
        }
    }
}

impl fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A route as written in config.
///
/// ```toml
/// [[routes]]
/// path = "/admin/dashboard"
/// name = "admin-dashboard"
/// requires = "admin"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub requires: Option<String>,
    #[serde(default)]
    pub children: Vec<RouteSpec>,
}

/// A navigable view: absolute path, display name, requirement, nested views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    path: String,
    name: String,
    requirement: AccessRequirement,
    children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        requirement: AccessRequirement,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            requirement,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<RouteDescriptor>) -> Self {
        self.children = children;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requirement(&self) -> AccessRequirement {
        self.requirement
    }

    pub fn children(&self) -> &[RouteDescriptor] {
        &self.children
    }

    /// Build from a config entry. Relative child paths are joined onto the
    /// parent. An unrecognized `requires` tag is a misconfigured route: it is
    /// logged and treated as `None`.
    fn from_spec(spec: RouteSpec, parent: Option<&str>) -> Self {
        let path = match parent {
            Some(parent) if !spec.path.starts_with('/') => {
                format!("{}/{}", parent.trim_end_matches('/'), spec.path)
            }
            _ => spec.path,
        };
        let requirement = match spec.requires.as_deref() {
            None => AccessRequirement::None,
            Some(tag) => AccessRequirement::from_tag(tag).unwrap_or_else(|| {
                warn!(
                    path = %path,
                    tag,
                    "misconfigured route: unknown requirement tag, treating as none"
                );
                AccessRequirement::None
            }),
        };
        let name = spec.name.unwrap_or_else(|| path.clone());
        let children = spec
            .children
            .into_iter()
            .map(|child| RouteDescriptor::from_spec(child, Some(&path)))
            .collect();
        Self {
            path,
            name,
            requirement,
            children,
        }
    }
}

/// Immutable set of routes consulted by the navigator.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Build and validate a route table.
    ///
    /// Rejects relative or duplicate paths, and login routes whose matched
    /// chain carries a requirement (a guarded login view would redirect to
    /// itself forever).
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&RouteDescriptor> = routes.iter().collect();
        while let Some(route) = stack.pop() {
            if !route.path.starts_with('/') {
                return Err(Error::RouteTable(format!(
                    "route path must be absolute, got: {}",
                    route.path
                )));
            }
            let path = normalize_path(&route.path);
            if !seen.insert(path.to_string()) {
                return Err(Error::RouteTable(format!("duplicate route path: {path}")));
            }
            stack.extend(route.children.iter());
        }

        let table = Self { routes };
        for login in [LOGIN_PATH, ADMIN_LOGIN_PATH] {
            let requirement = table.requirement_for(login);
            if requirement != AccessRequirement::None {
                return Err(Error::RouteTable(format!(
                    "login route {login} must not require a credential, resolves to {requirement}"
                )));
            }
        }
        Ok(table)
    }

    /// Build from config entries.
    pub fn from_specs(specs: Vec<RouteSpec>) -> Result<Self> {
        let routes = specs
            .into_iter()
            .map(|spec| RouteDescriptor::from_spec(spec, None))
            .collect();
        Self::new(routes)
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Matched route chain for `path`, outermost first. Empty when no route
    /// matches. Query and fragment are ignored.
    pub fn resolve(&self, path: &str) -> Vec<&RouteDescriptor> {
        let target = normalize_path(path);
        let mut chain = Vec::new();
        for route in &self.routes {
            if match_chain(route, target, &mut chain) {
                return chain;
            }
        }
        Vec::new()
    }

    /// Effective requirement for `path`.
    ///
    /// A user requirement anywhere in the matched chain wins over an admin
    /// one; unmatched paths are unguarded.
    pub fn requirement_for(&self, path: &str) -> AccessRequirement {
        let chain = self.resolve(path);
        if chain.is_empty() {
            debug!(path, "no route matched, treating as unguarded");
            return AccessRequirement::None;
        }
        if chain
            .iter()
            .any(|r| r.requirement == AccessRequirement::RequiresUser)
        {
            AccessRequirement::RequiresUser
        } else if chain
            .iter()
            .any(|r| r.requirement == AccessRequirement::RequiresAdmin)
        {
            AccessRequirement::RequiresAdmin
        } else {
            AccessRequirement::None
        }
    }
}

impl Default for RouteTable {
    /// The front-end's route layout: the two login views, the admin
    /// dashboard, and the chat view nested in the main layout.
    fn default() -> Self {
        Self {
            routes: vec![
                RouteDescriptor::new(LOGIN_PATH, "login", AccessRequirement::None),
                RouteDescriptor::new(ADMIN_LOGIN_PATH, "admin-login", AccessRequirement::None),
                RouteDescriptor::new(
                    "/admin/dashboard",
                    "admin-dashboard",
                    AccessRequirement::RequiresAdmin,
                ),
                RouteDescriptor::new("/", "layout", AccessRequirement::None).with_children(vec![
                    RouteDescriptor::new("/chat", "chat", AccessRequirement::None),
                ]),
            ],
        }
    }
}

fn match_chain<'a>(
    route: &'a RouteDescriptor,
    target: &str,
    chain: &mut Vec<&'a RouteDescriptor>,
) -> bool {
    chain.push(route);
    if normalize_path(&route.path) == target {
        return true;
    }
    for child in &route.children {
        if match_chain(child, target, chain) {
            return true;
        }
    }
    chain.pop();
    false
}

/// Strip query and fragment, and a trailing slash other than the root.
pub(crate) fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
