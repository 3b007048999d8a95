//! Validation utilities for the Hospital Pharmacy Inventory

use rust_decimal::Decimal;

use crate::types::Quantity;

/// Longest identifier accepted for codes and lot numbers, in characters
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Largest quantity a single movement may carry
pub const MAX_QUANTITY: Quantity = 1_000_000_000;

/// Decimal places kept for unit costs (`NUMERIC(14, 4)`)
pub const UNIT_COST_SCALE: u32 = 4;

/// Largest unit cost that fits `NUMERIC(14, 4)`: 9,999,999,999.9999
pub const MAX_UNIT_COST: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4);

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a medication code (e.g. "010.000.5550.00")
pub fn validate_medication_code(code: &str) -> Result<(), &'static str> {
    validate_identifier(code, "Medication code is required")
}

/// Validate a staff member identifier
pub fn validate_staff_id(id: &str) -> Result<(), &'static str> {
    validate_identifier(id, "Staff id is required")
}

/// Validate that a display field is present
pub fn validate_required_text(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field is required");
    }
    Ok(())
}

fn validate_identifier(value: &str, missing: &'static str) -> Result<(), &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing);
    }
    if trimmed.len() != value.len() {
        return Err("Identifier must not have leading or trailing whitespace");
    }
    if value.chars().count() > MAX_IDENTIFIER_LEN {
        return Err("Identifier must be at most 64 characters");
    }
    if value.chars().any(char::is_control) {
        return Err("Identifier contains control characters");
    }
    Ok(())
}

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate a printed lot number
pub fn validate_lot_number(lot_number: &str) -> Result<(), &'static str> {
    validate_identifier(lot_number, "Lot number is required")
}

/// Validate a quantity entering or leaving stock
pub fn validate_quantity(quantity: Quantity) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity exceeds the maximum of 1000000000 units");
    }
    Ok(())
}

/// Validate a unit cost (free samples may cost zero)
pub fn validate_unit_cost(unit_cost: Decimal) -> Result<(), &'static str> {
    if unit_cost < Decimal::ZERO {
        return Err("Unit cost cannot be negative");
    }
    if unit_cost > MAX_UNIT_COST {
        return Err("Unit cost exceeds the maximum of 9999999999.9999");
    }
    if unit_cost.scale() > UNIT_COST_SCALE {
        return Err("Unit cost allows at most 4 decimal places");
    }
    Ok(())
}

// ============================================================================
// Checked Arithmetic
// ============================================================================

/// Sum quantities, `None` on overflow
pub fn checked_quantity_sum<I>(quantities: I) -> Option<Quantity>
where
    I: IntoIterator<Item = Quantity>,
{
    quantities
        .into_iter()
        .try_fold(0 as Quantity, |total, quantity| total.checked_add(quantity))
}

/// `quantity * unit_cost`, `None` on overflow
pub fn checked_line_cost(quantity: Quantity, unit_cost: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_cost)
}

/// Sum amounts, `None` on overflow
pub fn checked_amount_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_medication_code_valid() {
        assert!(validate_medication_code("010.000.5550.00").is_ok());
        assert!(validate_medication_code("MED-1").is_ok());
    }

    #[test]
    fn test_validate_medication_code_invalid() {
        assert!(validate_medication_code("").is_err());
        assert!(validate_medication_code("   ").is_err());
        assert!(validate_medication_code(" 010.000.5550.00").is_err());
        assert!(validate_medication_code(&"9".repeat(65)).is_err());
        assert!(validate_medication_code("abc\n").is_err());
    }

    #[test]
    fn test_identifier_length_counts_characters() {
        // 64 two-byte characters: 128 bytes but within the limit
        assert!(validate_medication_code(&"Ñ".repeat(64)).is_ok());
        assert!(validate_medication_code(&"Ñ".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_lot_number() {
        assert!(validate_lot_number("L001").is_ok());
        assert_eq!(validate_lot_number(""), Err("Lot number is required"));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
        assert!(validate_quantity(Quantity::MAX).is_err());
    }

    #[test]
    fn test_validate_unit_cost() {
        assert!(validate_unit_cost(Decimal::ZERO).is_ok());
        assert!(validate_unit_cost(Decimal::new(250, 2)).is_ok());
        assert!(validate_unit_cost(Decimal::new(-1, 2)).is_err());
        assert!(validate_unit_cost(MAX_UNIT_COST).is_ok());
        assert!(validate_unit_cost(Decimal::new(100_000_000_000, 0)).is_err());
        assert!(validate_unit_cost(Decimal::new(12345, 5)).is_err());
    }

    #[test]
    fn test_max_unit_cost_fits_column() {
        assert_eq!(MAX_UNIT_COST.to_string(), "9999999999.9999");
    }

    #[test]
    fn test_bounded_line_cost_never_overflows() {
        assert!(checked_line_cost(MAX_QUANTITY, MAX_UNIT_COST).is_some());
        assert_eq!(checked_line_cost(Quantity::MAX, Decimal::MAX), None);
    }

    #[test]
    fn test_checked_sums() {
        assert_eq!(checked_quantity_sum([1, 2, 3]), Some(6));
        assert_eq!(checked_quantity_sum([Quantity::MAX, 1]), None);
        assert_eq!(
            checked_amount_sum([Some(Decimal::ONE), Some(Decimal::from(2))]),
            Some(Decimal::from(3))
        );
        assert_eq!(checked_amount_sum([Some(Decimal::MAX), Some(Decimal::ONE)]), None);
        assert_eq!(checked_amount_sum([Some(Decimal::ONE), None]), None);
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("IDURSULFASA").is_ok());
        assert!(validate_required_text(" ").is_err());
    }
}
