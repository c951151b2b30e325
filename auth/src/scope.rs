//! Scope names and per-route scope requirements.
//!
//! A requirement is a list of scope templates. Templates may reference path
//! parameters (`user-{params.id}`); they are instantiated per request and the
//! result is matched literally against the scopes granted by the token.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use crate::jwt::TokenKind;

/// Elevated scope granted to administrators.
pub const ADMIN: &str = "admin";
/// Scope carried by refresh tokens.
pub const REFRESH: &str = "refresh";
/// Prefix of per-user scopes (`user-<id>`).
pub const USER: &str = "user";
/// Template granting access to the user named by the `id` path parameter.
pub const USER_ID: &str = "user-{params.id}";

/// Per-user scope for the given id.
pub fn user_scope(id: impl fmt::Display) -> String {
    format!("{}-{}", USER, id)
}

const PARAMS_PREFIX: &str = "params.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Scope string with optional `{params.<name>}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl ScopeTemplate {
    /// Parse a template.
    ///
    /// Text outside braces is literal. A brace group naming anything other
    /// than `params.<name>`, or an unclosed brace, is kept as literal text.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source.as_str();

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            match after.find('}') {
                Some(close) => {
                    let expression = &after[..close];
                    match expression.strip_prefix(PARAMS_PREFIX) {
                        Some(name) if !name.is_empty() => {
                            if !literal.is_empty() {
                                segments.push(Segment::Literal(std::mem::take(&mut literal)));
                            }
                            segments.push(Segment::Param(name.to_string()));
                        }
                        _ => {
                            literal.push('{');
                            literal.push_str(expression);
                            literal.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    literal.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { source, segments }
    }

    /// Substitute path parameters.
    ///
    /// # Returns
    /// The concrete scope, or `None` when a referenced parameter is absent
    pub fn instantiate(&self, params: &HashMap<String, String>) -> Option<String> {
        let mut scope = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => scope.push_str(text),
                Segment::Param(name) => scope.push_str(params.get(name)?),
            }
        }

        Some(scope)
    }
}

impl From<&str> for ScopeTemplate {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl fmt::Display for ScopeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.source.fmt(f)
    }
}

/// Which token kind a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Refresh,
    Access,
}

impl Strategy {
    pub fn accepts(&self, kind: TokenKind) -> bool {
        matches!(
            (self, kind),
            (Strategy::Refresh, TokenKind::Refresh) | (Strategy::Access, TokenKind::Access)
        )
    }
}

/// Declarative authentication requirement of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequirement {
    pub strategy: Strategy,
    pub scopes: Vec<ScopeTemplate>,
}

impl AuthRequirement {
    /// Requirement for routes authorised by access tokens.
    pub fn access(scopes: &[&str]) -> Self {
        Self {
            strategy: Strategy::Access,
            scopes: scopes.iter().map(|s| ScopeTemplate::new(*s)).collect(),
        }
    }

    /// Requirement for routes authorised by refresh tokens.
    pub fn refresh(scopes: &[&str]) -> Self {
        Self {
            strategy: Strategy::Refresh,
            scopes: scopes.iter().map(|s| ScopeTemplate::new(*s)).collect(),
        }
    }

    /// Concrete scopes for a request; templates with missing parameters drop out.
    pub fn required_scopes(&self, params: &HashMap<String, String>) -> HashSet<String> {
        self.scopes
            .iter()
            .filter_map(|template| template.instantiate(params))
            .collect()
    }

    /// True when the granted scopes intersect the instantiated requirement.
    ///
    /// A requirement without scopes is satisfied by any token.
    pub fn is_satisfied_by(&self, granted: &[String], params: &HashMap<String, String>) -> bool {
        if self.scopes.is_empty() {
            return true;
        }

        let required = self.required_scopes(params);
        granted.iter().any(|scope| required.contains(scope))
    }
}
