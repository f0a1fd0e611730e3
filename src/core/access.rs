// Role-based access checks for procurement operations.
//
// Users are plain records; what a user may do is decided by looking up the
// role's permission set, checked by the caller before invoking a service.

use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Capabilities that can be granted to a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create orders, edit line items, register suppliers
    ManageOrders,
    /// Approve or cancel orders
    ApproveOrders,
    /// Mark orders shipped/delivered
    ReceiveGoods,
    /// Create invoices from orders
    ManageInvoices,
    /// Record supplier payments
    RecordPayments,
    /// Read supplier balances
    ViewLedger,
    /// Administer user accounts
    ManageUsers,
}

/// System role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

impl Role {
    /// Permissions granted to this role
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Admin => &[
                ManageOrders,
                ApproveOrders,
                ReceiveGoods,
                ManageInvoices,
                RecordPayments,
                ViewLedger,
                ManageUsers,
            ],
            Role::Manager => &[
                ManageOrders,
                ApproveOrders,
                ReceiveGoods,
                ManageInvoices,
                ViewLedger,
            ],
            // Requesters raise orders and take payments at the counter
            Role::Cashier => &[ManageOrders, RecordPayments],
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Manager => write!(f, "MANAGER"),
            Role::Cashier => write!(f, "CASHIER"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "CASHIER" | "REQUESTER" => Ok(Role::Cashier),
            _ => Err(AppError::validation(format!("Invalid role: {}", s))),
        }
    }
}

/// An authenticated user as seen by the procurement core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }

    /// Fails with `Unauthorized` when the user's role lacks `permission`
    pub fn authorize(&self, permission: Permission) -> Result<()> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = self.id,
                role = %self.role,
                ?permission,
                "Permission denied"
            );
            Err(AppError::unauthorized(format!(
                "{} ({}) lacks {:?}",
                self.username, self.role, permission
            )))
        }
    }
}
