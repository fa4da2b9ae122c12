//! A service for interacting with items.

use super::item_repository::{Item, ItemRepository, NewItem, ValidItem};
use crate::infra::error::ApiResult;
use rust_decimal::Decimal;
use tracing::instrument;

/// Why an item was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidItem {
    /// The name is missing or blank.
    #[error("No name specified")]
    MissingName,
    /// The price is missing.
    #[error("No price specified")]
    MissingPrice,
    /// The price is zero or negative.
    #[error("Price must be greater than zero")]
    NonPositivePrice,
    /// The price is positive but has more than 28 decimal places or is too large.
    #[error("Price cannot be represented exactly")]
    UnrepresentablePrice,
}

impl InvalidItem {
    /// The error code reported to clients for every invalid item.
    pub const CODE: u16 = 101;
}

impl TryFrom<NewItem> for ValidItem {
    type Error = InvalidItem;

    /// Checks name, then price presence, then price sign. The first failure wins.
    fn try_from(item: NewItem) -> Result<Self, Self::Error> {
        let name = match item.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(InvalidItem::MissingName),
        };
        let text = item.price.ok_or(InvalidItem::MissingPrice)?.to_string();
        let price = match parse_price(&text) {
            Some(price) => price,
            // Whatever the magnitude, a negative number fails the sign check first.
            None if text.starts_with('-') => return Err(InvalidItem::NonPositivePrice),
            None => return Err(InvalidItem::UnrepresentablePrice),
        };
        if price <= Decimal::ZERO {
            return Err(InvalidItem::NonPositivePrice);
        }
        Ok(ValidItem { name, price })
    }
}

/// Parses the text of a JSON number into a [`Decimal`] without rounding.
///
/// Returns `None` when the exact value does not fit, either because it needs
/// more than 28 decimal places or because it exceeds the 96-bit mantissa.
fn parse_price(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = match text.split_once(|c| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
        None => (text, 0),
    };
    if mantissa.bytes().all(|b| !b.is_ascii_digit() || b == b'0') {
        return Some(Decimal::ZERO);
    }
    let mut price = Decimal::from_str_exact(mantissa).ok()?;
    if exponent < 0 {
        let shift = u32::try_from(exponent.unsigned_abs()).ok()?;
        price.set_scale(price.scale().checked_add(shift)?).ok()?;
    } else {
        // Non-zero, so this overflows within a few dozen steps for huge exponents.
        for _ in 0..exponent {
            if price.scale() > 0 {
                price.set_scale(price.scale() - 1).ok()?;
            } else {
                price = price.checked_mul(Decimal::TEN)?;
            }
        }
    }
    Some(price)
}

/// Validates a new item.
pub fn validate_item(new_item: NewItem) -> Result<ValidItem, InvalidItem> {
    ValidItem::try_from(new_item)
}

/// Validates and stores a new item.
#[instrument(skip(repository))]
pub async fn save_item<R: ItemRepository + ?Sized>(
    repository: &R,
    new_item: NewItem,
) -> ApiResult<Item> {
    let item = validate_item(new_item).inspect_err(|e| tracing::info!("Rejected item: {e}"))?;
    repository.create_item(item).await
}

/// Lists all items.
#[instrument(skip(repository))]
pub async fn list_items<R: ItemRepository + ?Sized>(repository: &R) -> ApiResult<Vec<Item>> {
    repository.list_items().await
}
