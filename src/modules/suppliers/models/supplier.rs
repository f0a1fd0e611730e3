// Supplier directory entry.
//
// Orders may only be raised against an ACTIVE supplier; deactivating one keeps
// its history (orders, invoices) intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result, SupplierId};

const MAX_NAME_CHARS: usize = 100;
const MAX_PHONE_CHARS: usize = 30;
const MAX_TEXT_CHARS: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupplierStatus {
    Active,
    Inactive,
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierStatus::Active => "ACTIVE",
            SupplierStatus::Inactive => "INACTIVE",
        }
    }
}

impl std::fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SupplierStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(SupplierStatus::Active),
            "INACTIVE" => Ok(SupplierStatus::Inactive),
            _ => Err(AppError::validation(format!("Invalid supplier status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: SupplierStatus,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    /// Fails with `InvalidState` unless the supplier can take new orders
    pub fn ensure_active(&self) -> Result<()> {
        if self.status != SupplierStatus::Active {
            return Err(AppError::invalid_state(format!(
                "Supplier {} ({}) is {}",
                self.id, self.name, self.status
            )));
        }
        Ok(())
    }
}

/// Input for registering a supplier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewSupplier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn contact(mut self, contact_name: impl Into<String>) -> Self {
        self.contact_name = Some(contact_name.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Trim every field and drop blank optional ones
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: self.name.trim().to_string(),
            contact_name: clean(self.contact_name),
            phone: clean(self.phone),
            email: clean(self.email),
            address: clean(self.address),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Supplier name cannot be empty"));
        }
        check_length("Supplier name", name, MAX_NAME_CHARS)?;

        if let Some(contact) = &self.contact_name {
            check_length("Contact name", contact, MAX_NAME_CHARS)?;
        }
        if let Some(phone) = &self.phone {
            check_length("Phone", phone, MAX_PHONE_CHARS)?;
        }
        if let Some(address) = &self.address {
            check_length("Address", address, MAX_TEXT_CHARS)?;
        }
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            check_length("Email", email, MAX_TEXT_CHARS)?;
            if !email.contains('@') {
                return Err(AppError::validation(format!("Invalid email: {}", email)));
            }
        }

        Ok(())
    }

    /// Row as it is first stored: ACTIVE
    pub fn into_supplier(self, id: SupplierId, created_at: DateTime<Utc>) -> Supplier {
        Supplier {
            id,
            name: self.name,
            contact_name: self.contact_name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            status: SupplierStatus::Active,
            created_at,
        }
    }
}

fn check_length(field: &str, value: &str, max_chars: usize) -> Result<()> {
    if value.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "{} cannot exceed {} characters",
            field, max_chars
        )));
    }
    Ok(())
}
