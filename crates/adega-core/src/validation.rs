//! # Validation Module
//!
//! Input validation for Adega POS.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web form                                                      │
//! │  └── Text fields ("100,50"), selects, quantity buttons                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: adega-pos services                                            │
//! │  └── THIS MODULE: parse amounts, check names, quantities, prices        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (quantity > 0, subtotal = quantity * unit_price)             │
//! │  ├── Partial UNIQUE index (one open cash session per operator)          │
//! │  └── Foreign keys                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a product or category name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a movement description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

// =============================================================================
// Amount Parsing
// =============================================================================

/// Parses an operator-typed amount into [`Money`].
///
/// Accepts both decimal separators: `"100,50"` and `"100.50"` are the same
/// amount. At most two fractional digits. A leading `-` is kept so callers
/// can report "must not be negative" instead of "invalid format".
///
/// ## Example
/// ```rust
/// use adega_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("opening amount", "100,50").unwrap().cents(), 10050);
/// assert_eq!(parse_amount("opening amount", "100.5").unwrap().cents(), 10050);
/// assert_eq!(parse_amount("opening amount", "R$ 7").unwrap().cents(), 700);
/// assert!(parse_amount("opening amount", "abc").is_err());
/// ```
pub fn parse_amount(field: &str, input: &str) -> ValidationResult<Money> {
    let mut text = input.trim();
    if let Some(rest) = text.strip_prefix("R$") {
        text = rest.trim_start();
    }

    if text.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let normalized = digits.replace(',', ".");
    let (whole, fraction) = match normalized.split_once('.') {
        Some((w, f)) => (w, f),
        None => (normalized.as_str(), ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("not a number"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("not a number"));
    }
    if fraction.len() > 2 {
        return Err(invalid("at most two decimal places"));
    }

    let reais: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("amount too large"))?
    };
    let centavos: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
        _ => fraction.parse().map_err(|_| invalid("not a number"))?,
    };

    let cents = reais
        .checked_mul(100)
        .and_then(|c| c.checked_add(centavos))
        .ok_or_else(|| invalid("amount too large"))?;

    Ok(Money::from_cents(if negative { -cents } else { cents }))
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a movement description ("Sangria para banco", "Troco inicial").
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Normalizes an optional free-text field: blank becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price (cost or sale price). Zero is allowed.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock quantity. Zero is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates the amount a register is opened with. Zero is allowed.
pub fn validate_opening_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a manual cash movement amount.
pub fn validate_movement_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of distinct products).
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_separators() {
        assert_eq!(parse_amount("a", "100,50").unwrap().cents(), 10050);
        assert_eq!(parse_amount("a", "100.50").unwrap().cents(), 10050);
        assert_eq!(parse_amount("a", "100").unwrap().cents(), 10000);
        assert_eq!(parse_amount("a", "0,5").unwrap().cents(), 50);
        assert_eq!(parse_amount("a", ",99").unwrap().cents(), 99);
        assert_eq!(parse_amount("a", "  12,3  ").unwrap().cents(), 1230);
        assert_eq!(parse_amount("a", "R$ 55,50").unwrap().cents(), 5550);
    }

    #[test]
    fn test_parse_amount_negative_keeps_sign() {
        assert_eq!(parse_amount("a", "-10").unwrap().cents(), -1000);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("a", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_amount("a", "abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(parse_amount("a", "1.2.3").is_err());
        assert!(parse_amount("a", "1,234").is_err());
        assert!(parse_amount("a", ",").is_err());
        assert!(parse_amount("a", "99999999999999999999").is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Heineken 600ml").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
        assert!(validate_product_name(&"Ã".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Sangria").is_ok());
        assert!(validate_description("").is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  João ")), Some("João".to_string()));
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_money_validators() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_cents(-1)).is_err());
        assert!(validate_opening_amount(Money::zero()).is_ok());
        assert!(validate_opening_amount(Money::from_cents(-100)).is_err());
        assert!(validate_movement_amount(Money::zero()).is_err());
        assert!(validate_movement_amount(Money::from_cents(1)).is_ok());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }
}
