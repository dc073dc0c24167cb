//! Position-based authorization decisions.
//!
//! Everything here is pure: callers do the position lookup and hand the
//! result in, which keeps the rules testable without a backend.

use crate::domain::{Position, UserId};

/// Positions that are always elevated, regardless of level.
pub const ELEVATED_POSITION_NAMES: [&str; 2] = ["owner", "admin"];

/// Minimum level that is elevated on its own.
pub const ELEVATED_MIN_LEVEL: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    PositionNotFound,
    InsufficientPermissions,
}

impl DenyReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::PositionNotFound => "Position not found",
            Self::InsufficientPermissions => "Insufficient permissions",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Set of position names permitted on a route. Matching is case-insensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList {
    names: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, position_name: &str) -> bool {
        let name = position_name.trim().to_lowercase();
        self.names.iter().any(|n| *n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

pub fn is_elevated(position: &Position) -> bool {
    let name = position.name.trim().to_lowercase();
    position.level >= ELEVATED_MIN_LEVEL || ELEVATED_POSITION_NAMES.contains(&name.as_str())
}

/// Allow-list rule: the caller's position must exist and be listed.
pub fn check_allow_list(position: Option<&Position>, allowed: &AllowList) -> Decision {
    let Some(position) = position else {
        return Decision::Deny(DenyReason::PositionNotFound);
    };
    if allowed.contains(&position.name) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::InsufficientPermissions)
    }
}

/// Whether the elevated/self rule can be settled without a position lookup.
pub fn is_self_access(caller: &UserId, target: &str) -> bool {
    !target.is_empty() && caller.as_str() == target
}

/// Elevated/self rule: self-access always passes; otherwise the caller needs
/// an elevated position.
pub fn check_elevated_or_self(
    caller: &UserId,
    target: &str,
    position: Option<&Position>,
) -> Decision {
    if is_self_access(caller, target) {
        return Decision::Allow;
    }
    match position {
        None => Decision::Deny(DenyReason::PositionNotFound),
        Some(p) if is_elevated(p) => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::InsufficientPermissions),
    }
}
