// A single line of a purchase order.
//
// Money fields are kept at two decimals. `subtotal` is quantity × unit price;
// discount comes off the subtotal and tax is charged on what remains. The
// parent order's running total only counts quantity × unit price; discount and
// tax are settled on the line itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::{self, ToMoney};
use crate::core::{AppError, ItemId, OrderId, ProductId, Result};

fn max_tax_rate() -> Decimal {
    Decimal::new(9_999_999, 4)
}

/// Represents a single line item in a purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Store-assigned id, `None` until persisted
    #[serde(default)]
    pub id: Option<ItemId>,

    /// Parent purchase order
    pub order_id: OrderId,

    pub product_id: ProductId,

    /// Number of units, always positive
    pub quantity: i32,

    #[serde(with = "money::as_string")]
    pub unit_price: Decimal,

    /// Absolute discount, never above the subtotal
    #[serde(with = "money::as_string")]
    pub discount: Decimal,

    /// Fraction, e.g. `0.11` for 11%
    pub tax_rate: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Explicit set of pricing fields a caller may change on an existing line
///
/// `discount_amount` and `discount_percent` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemPricingUpdate {
    pub discount_amount: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
}

impl LineItemPricingUpdate {
    pub fn is_empty(&self) -> bool {
        self.discount_amount.is_none() && self.discount_percent.is_none() && self.tax_rate.is_none()
    }
}

impl OrderLineItem {
    /// Create a line with no discount and no tax
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: impl ToMoney,
    ) -> Result<Self> {
        Self::with_adjustments(
            order_id,
            product_id,
            quantity,
            unit_price,
            Decimal::ZERO,
            Decimal::ZERO,
        )
    }

    /// Create a line with discount and tax
    ///
    /// # Errors
    /// * `Validation` - non-positive quantity, negative price/discount/tax,
    ///   non-numeric price or discount, or a discount above the subtotal
    pub fn with_adjustments(
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: impl ToMoney,
        discount: impl ToMoney,
        tax_rate: Decimal,
    ) -> Result<Self> {
        let unit_price = unit_price.to_money()?;
        let discount = discount.to_money()?;

        Self::validate_quantity(quantity)?;
        Self::validate_unit_price(unit_price)?;
        Self::validate_tax_rate(tax_rate)?;

        let now = Utc::now();
        let item = Self {
            id: None,
            order_id,
            product_id,
            quantity,
            unit_price,
            discount: money::zero(),
            tax_rate,
            created_at: now,
            updated_at: now,
        };
        item.validate_discount(discount)?;

        Ok(Self { discount, ..item })
    }

    /// quantity × unit_price
    ///
    /// Validated lines always fit; the arithmetic saturates rather than panics
    /// for a line whose public fields were edited past the money range.
    pub fn subtotal(&self) -> Decimal {
        money::quantize(Decimal::from(self.quantity).saturating_mul(self.unit_price))
    }

    /// quantity × unit_price, failing when it leaves the money range
    pub fn checked_subtotal(&self) -> Result<Decimal> {
        money::checked_mul(Decimal::from(self.quantity), self.unit_price).map_err(|_| {
            AppError::validation(format!(
                "Line subtotal out of range: {} x {} exceeds {}",
                self.quantity,
                self.unit_price,
                money::max_amount()
            ))
        })
    }

    /// Subtotal less discount, floored at zero
    pub fn total_after_discount(&self) -> Decimal {
        let net = self.subtotal().saturating_sub(self.discount);
        if net < Decimal::ZERO {
            return money::zero();
        }
        money::quantize(net)
    }

    /// Tax on the discounted amount
    pub fn tax_amount(&self) -> Decimal {
        money::quantize(self.total_after_discount().saturating_mul(self.tax_rate))
    }

    /// Amount payable for this line
    pub fn total(&self) -> Decimal {
        money::quantize(self.total_after_discount().saturating_add(self.tax_amount()))
    }

    /// Replace the discount with an absolute amount
    pub fn apply_discount_amount(&mut self, value: impl ToMoney) -> Result<()> {
        let discount = value.to_money()?;
        self.validate_discount(discount)?;
        self.discount = discount;
        self.touch();
        Ok(())
    }

    /// Replace the discount with a percentage (0–100) of the subtotal
    pub fn apply_discount_percent(&mut self, pct: Decimal) -> Result<()> {
        if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
            return Err(AppError::validation(format!(
                "Discount percent must be between 0 and 100, got: {}",
                pct
            )));
        }
        self.apply_discount_amount(money::percent_of(self.subtotal(), pct))
    }

    /// Replace the tax rate
    pub fn apply_tax_rate(&mut self, tax_rate: Decimal) -> Result<()> {
        Self::validate_tax_rate(tax_rate)?;
        self.tax_rate = tax_rate;
        self.touch();
        Ok(())
    }

    /// Apply a pricing update all-or-nothing
    pub fn apply_pricing(&mut self, update: &LineItemPricingUpdate) -> Result<()> {
        let mut next = self.clone();

        match (update.discount_amount, update.discount_percent) {
            (Some(_), Some(_)) => {
                return Err(AppError::validation(
                    "Provide either a discount amount or a discount percent, not both",
                ))
            }
            (Some(amount), None) => next.apply_discount_amount(amount)?,
            (None, Some(pct)) => next.apply_discount_percent(pct)?,
            (None, None) => {}
        }

        if let Some(rate) = update.tax_rate {
            next.apply_tax_rate(rate)?;
        }

        *self = next;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and re-validate a serialized line
    pub fn from_json(payload: &str) -> Result<Self> {
        let item: Self = serde_json::from_str(payload)?;
        Self::validate_quantity(item.quantity)?;
        Self::validate_unit_price(item.unit_price)?;
        Self::validate_tax_rate(item.tax_rate)?;
        item.validate_discount(item.discount)?;
        Ok(item)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn validate_quantity(quantity: i32) -> Result<()> {
        if quantity <= 0 {
            return Err(AppError::validation(format!(
                "Quantity must be positive, got: {}",
                quantity
            )));
        }

        Ok(())
    }

    fn validate_unit_price(unit_price: Decimal) -> Result<()> {
        if unit_price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Unit price must be non-negative, got: {}",
                unit_price
            )));
        }

        Ok(())
    }

    fn validate_tax_rate(tax_rate: Decimal) -> Result<()> {
        if tax_rate < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Tax rate must be non-negative, got: {}",
                tax_rate
            )));
        }

        // DECIMAL(7,4)
        if tax_rate > max_tax_rate() {
            return Err(AppError::validation(format!(
                "Tax rate cannot exceed {}, got: {}",
                max_tax_rate(),
                tax_rate
            )));
        }

        Ok(())
    }

    fn validate_discount(&self, discount: Decimal) -> Result<()> {
        if discount < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Discount must be non-negative, got: {}",
                discount
            )));
        }

        let subtotal = self.checked_subtotal()?;
        if discount > subtotal {
            return Err(AppError::validation(format!(
                "Discount {} cannot exceed line subtotal {}",
                discount, subtotal
            )));
        }

        Ok(())
    }
}
