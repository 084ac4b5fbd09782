//! Product list filtering for the catalog and order-entry screens.

use crate::types::{Product, ProductInput};
use crate::validation::{validate_price, validate_product_name, validate_stock, ValidationResult};
use crate::money::Money;

/// Filters `products` by a case-insensitive name substring and an optional
/// category id. A blank term matches everything.
pub fn filter_products<'a>(
    products: &'a [Product],
    term: &str,
    category_id: Option<&str>,
) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .filter(|p| match category_id {
            Some(cat) => p.category_id.as_deref() == Some(cat),
            None => true,
        })
        .collect()
}

/// Products that can still be sold (stock > 0), as listed on the tab screen.
pub fn in_stock(products: &[Product]) -> impl Iterator<Item = &Product> {
    products.iter().filter(|p| p.stock > 0)
}

/// Checks a product form before it is written.
pub fn validate_product(input: &ProductInput) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_price("cost", Money::from_cents(input.cost_cents))?;
    validate_price("price", Money::from_cents(input.price_cents))?;
    validate_stock(input.stock)?;
    Ok(())
}
