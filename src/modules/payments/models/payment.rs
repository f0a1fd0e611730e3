use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::{self, ToMoney};
use crate::core::{AppError, InvoiceId, PaymentId, Result};

/// How a supplier was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    Cheque,
    CreditCard,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::BankTransfer
    }
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Cheque => "CHEQUE",
            PaymentMethod::CreditCard => "CREDIT_CARD",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "CASH" => Ok(PaymentMethod::Cash),
            "CHEQUE" | "CHECK" => Ok(PaymentMethod::Cheque),
            "CREDIT_CARD" | "CARD" => Ok(PaymentMethod::CreditCard),
            _ => Err(AppError::validation(format!("Invalid payment method: {}", s))),
        }
    }
}

/// Append-only record of money paid against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    pub invoice_id: InvoiceId,

    pub payment_date: DateTime<Utc>,

    #[serde(with = "money::as_string")]
    pub amount: Decimal,

    pub method: PaymentMethod,
}

/// Payment row before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub invoice_id: InvoiceId,
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
    pub method: PaymentMethod,
}

impl NewPayment {
    /// Build a payment dated now
    ///
    /// # Errors
    /// * `Validation` - non-numeric or non-positive amount
    pub fn new(invoice_id: InvoiceId, amount: impl ToMoney, method: PaymentMethod) -> Result<Self> {
        let amount = amount.to_money()?;
        if amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Payment amount must be positive, got: {}",
                amount
            )));
        }

        Ok(Self {
            invoice_id,
            payment_date: Utc::now(),
            amount,
            method,
        })
    }

    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment {
            id,
            invoice_id: self.invoice_id,
            payment_date: self.payment_date,
            amount: self.amount,
            method: self.method,
        }
    }
}
