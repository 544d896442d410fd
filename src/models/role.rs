use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Plant departments that exchange outbound-flow batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Cutting,
    Sewing,
    Finishing,
    Quality,
    Warehouse,
    Maintenance,
    Accounting,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Cutting,
        Department::Sewing,
        Department::Finishing,
        Department::Quality,
        Department::Warehouse,
        Department::Maintenance,
        Department::Accounting,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Department::Cutting => "cutting",
            Department::Sewing => "sewing",
            Department::Finishing => "finishing",
            Department::Quality => "quality",
            Department::Warehouse => "warehouse",
            Department::Maintenance => "maintenance",
            Department::Accounting => "accounting",
        }
    }

    /// Accepts the English code or the plant's Spanish name.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "cutting" | "corte" => Some(Department::Cutting),
            "sewing" | "confeccion" | "confección" => Some(Department::Sewing),
            "finishing" | "acabado" => Some(Department::Finishing),
            "quality" | "calidad" => Some(Department::Quality),
            "warehouse" | "almacen" | "almacén" => Some(Department::Warehouse),
            "maintenance" | "mantenimiento" => Some(Department::Maintenance),
            "accounting" | "contabilidad" => Some(Department::Accounting),
            _ => None,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Department {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::from_code(s).ok_or_else(|| AppError::InvalidRole(format!("unknown department '{s}'")))
    }
}

/// Role of an authenticated caller, as supplied by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// "Gerencia": read-only across the subsystem.
    Management,
    Supervisor,
    Department(Department),
    Worker,
}

/// Role without its department, the key of the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Admin,
    Management,
    Supervisor,
    Department,
    Worker,
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Admin => RoleKind::Admin,
            Role::Management => RoleKind::Management,
            Role::Supervisor => RoleKind::Supervisor,
            Role::Department(_) => RoleKind::Department,
            Role::Worker => RoleKind::Worker,
        }
    }

    pub fn department(&self) -> Option<Department> {
        match self {
            Role::Department(d) => Some(*d),
            _ => None,
        }
    }

    /// Convert DB / CLI string → enum.
    ///
    /// `department:<code>` and a bare department code both map to
    /// `Role::Department`.
    pub fn from_db_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "admin" => Some(Role::Admin),
            "management" | "gerencia" => Some(Role::Management),
            "supervisor" => Some(Role::Supervisor),
            "worker" | "operario" => Some(Role::Worker),
            other => {
                let code = other
                    .strip_prefix("department:")
                    .or_else(|| other.strip_prefix("dept:"))
                    .unwrap_or(other);
                Department::from_code(code).map(Role::Department)
            }
        }
    }

    pub fn to_db_str(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Management => f.write_str("management"),
            Role::Supervisor => f.write_str("supervisor"),
            Role::Department(d) => write!(f, "department:{d}"),
            Role::Worker => f.write_str("worker"),
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_db_str(s).ok_or_else(|| AppError::InvalidRole(s.to_string()))
    }
}

/// The caller of an operation: who they are and what role they act under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}
