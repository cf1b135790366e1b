//! Route access policy: an ordered list of (method, path pattern, access) rules, first match wins.

use crate::model::{Principal, Role};
use axum::http::Method;
use std::fmt;

const ADMIN: &[Role] = &[Role::Admin];
const USER_OR_ADMIN: &[Role] = &[Role::User, Role::Admin];

/// What a matched route requires of the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    AnyRole(&'static [Role]),
}

impl Access {
    pub fn permits(self, principal: &Principal) -> bool {
        match self {
            Access::Public | Access::Authenticated => true,
            Access::AnyRole(roles) => principal.has_any_role(roles),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => f.write_str("permitAll"),
            Access::Authenticated => f.write_str("authenticated"),
            Access::AnyRole(roles) => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "hasAnyRole({})", names.join(","))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*` or `{name}`: exactly one segment.
    One,
    /// `**`: zero or more segments.
    Rest,
}

/// Segment-wise path pattern, e.g. `/animes/**`, `/animes/{id}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(raw: &str) -> Self {
        let segments = split_path(raw)
            .into_iter()
            .map(|s| match s {
                "**" => Segment::Rest,
                "*" => Segment::One,
                s if s.starts_with('{') && s.ends_with('}') => Segment::One,
                s => Segment::Literal(s.to_string()),
            })
            .collect();
        PathPattern {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        match_segments(&self.segments, &split_path(path))
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Rest, rest)) => (0..=path.len())
            .filter_map(|skip| path.get(skip..))
            .any(|tail| match_segments(rest, tail)),
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => {
                let head_ok = match segment {
                    Segment::Literal(lit) => lit == head,
                    _ => true,
                };
                head_ok && match_segments(rest, tail)
            }
            None => false,
        },
    }
}

#[derive(Clone, Debug)]
pub struct AccessRule {
    /// `None` matches every method.
    pub method: Option<Method>,
    pub pattern: PathPattern,
    pub access: Access,
}

impl AccessRule {
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = self.method.as_ref().map_or("*", |m| m.as_str());
        write!(f, "{} {} -> {}", method, self.pattern.as_str(), self.access)
    }
}

/// Ordered rule table. Requests matching no rule need an authenticated caller.
#[derive(Clone, Debug, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, method: Option<Method>, pattern: &str, access: Access) -> Self {
        self.rules.push(AccessRule {
            method,
            pattern: PathPattern::new(pattern),
            access,
        });
        self
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// HEAD is served by the GET handlers, so it is checked against the GET rules.
    pub fn access_for(&self, method: &Method, path: &str) -> Access {
        let method = if *method == Method::HEAD { &Method::GET } else { method };
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map_or(Access::Authenticated, |rule| rule.access)
    }

    /// Rules for the anime API and its public metadata routes.
    pub fn standard() -> Self {
        let mut policy = AccessPolicy::new().rule(Some(Method::POST), "/login", Access::Public);
        for path in [
            "/health",
            "/ready",
            "/version",
            "/info",
            "/v3/api-docs/**",
            "/webjars/**",
            "/swagger-ui.html",
        ] {
            policy = policy.rule(Some(Method::GET), path, Access::Public);
        }
        policy
            .rule(Some(Method::POST), "/animes/**", Access::AnyRole(ADMIN))
            .rule(Some(Method::PUT), "/animes/**", Access::AnyRole(ADMIN))
            .rule(Some(Method::DELETE), "/animes/**", Access::AnyRole(ADMIN))
            .rule(Some(Method::GET), "/animes/**", Access::AnyRole(USER_OR_ADMIN))
    }
}
