//! Role-based access predicates over a declarative capability table.
//!
//! Every check answers with a boolean. The logic layer turns `false` into
//! `AppError::Forbidden`.

use crate::models::role::{Department, Principal, RoleKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Attendance,
    Production,
    FlowBatch,
}

/// How far a capability reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    None,
    /// Only resources owned by the caller's user or department.
    Own,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capability {
    #[serde(default)]
    pub read: Scope,
    #[serde(default)]
    pub write: Scope,
}

impl Capability {
    pub const fn new(read: Scope, write: Scope) -> Self {
        Self { read, write }
    }
}

/// Who a resource belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    pub users: Vec<String>,
    pub departments: Vec<Department>,
}

impl Owner {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            users: vec![id.into()],
            departments: Vec::new(),
        }
    }

    pub fn with_department(mut self, d: Department) -> Self {
        self.departments.push(d);
        self
    }

    pub fn department(d: Department) -> Self {
        Self {
            users: Vec::new(),
            departments: vec![d],
        }
    }

    fn includes(&self, principal: &Principal) -> bool {
        self.users.iter().any(|u| *u == principal.user_id)
            || principal
                .role
                .department()
                .is_some_and(|d| self.departments.contains(&d))
    }
}

/// `role → resource → {read, write}`; missing entries mean no access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityTable {
    entries: BTreeMap<RoleKind, BTreeMap<Resource, Capability>>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        use Resource::*;
        use Scope::{All, None, Own};

        let rows: [(RoleKind, [(Resource, Capability); 3]); 5] = [
            (
                RoleKind::Admin,
                [
                    (Attendance, Capability::new(All, All)),
                    (Production, Capability::new(All, All)),
                    (FlowBatch, Capability::new(All, All)),
                ],
            ),
            (
                RoleKind::Management,
                [
                    (Attendance, Capability::new(All, None)),
                    (Production, Capability::new(All, None)),
                    (FlowBatch, Capability::new(All, None)),
                ],
            ),
            (
                RoleKind::Supervisor,
                [
                    (Attendance, Capability::new(All, All)),
                    (Production, Capability::new(All, All)),
                    (FlowBatch, Capability::new(All, All)),
                ],
            ),
            (
                RoleKind::Department,
                [
                    (Attendance, Capability::new(None, None)),
                    (Production, Capability::new(All, None)),
                    (FlowBatch, Capability::new(Own, Own)),
                ],
            ),
            (
                RoleKind::Worker,
                [
                    (Attendance, Capability::new(Own, Own)),
                    (Production, Capability::new(Own, Own)),
                    (FlowBatch, Capability::new(None, None)),
                ],
            ),
        ];

        let entries = rows
            .into_iter()
            .map(|(role, caps)| (role, caps.into_iter().collect()))
            .collect();

        Self { entries }
    }
}

impl CapabilityTable {
    /// Empty table: every check fails.
    pub fn deny_all() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Override individual (role, resource) cells, keeping the rest.
    pub fn merged(mut self, overrides: &CapabilityTable) -> Self {
        for (role, caps) in &overrides.entries {
            let slot = self.entries.entry(*role).or_default();
            for (resource, cap) in caps {
                slot.insert(*resource, *cap);
            }
        }
        self
    }

    pub fn set(&mut self, role: RoleKind, resource: Resource, cap: Capability) {
        self.entries.entry(role).or_default().insert(resource, cap);
    }

    pub fn capability(&self, role: RoleKind, resource: Resource) -> Capability {
        self.entries
            .get(&role)
            .and_then(|caps| caps.get(&resource))
            .copied()
            .unwrap_or_default()
    }

    pub fn read_scope(&self, principal: &Principal, resource: Resource) -> Scope {
        self.capability(principal.role.kind(), resource).read
    }

    pub fn write_scope(&self, principal: &Principal, resource: Resource) -> Scope {
        self.capability(principal.role.kind(), resource).write
    }

    /// May the caller list this kind of resource at all?
    pub fn can_list(&self, principal: &Principal, resource: Resource) -> bool {
        self.read_scope(principal, resource) != Scope::None
    }

    pub fn can_read(&self, principal: &Principal, resource: Resource, owner: &Owner) -> bool {
        admits(self.read_scope(principal, resource), principal, owner)
    }

    pub fn can_write(&self, principal: &Principal, resource: Resource, owner: &Owner) -> bool {
        admits(self.write_scope(principal, resource), principal, owner)
    }
}

fn admits(scope: Scope, principal: &Principal, owner: &Owner) -> bool {
    match scope {
        Scope::None => false,
        Scope::Own => owner.includes(principal),
        Scope::All => true,
    }
}

/// Turn a denied check into the error returned to callers.
/// The message stays generic; the details only reach the log.
pub fn forbidden(caller: &Principal, operation: &str) -> crate::errors::AppError {
    tracing::warn!(
        user = %caller.user_id,
        role = %caller.role,
        operation,
        "access denied"
    );
    crate::errors::AppError::Forbidden
}
