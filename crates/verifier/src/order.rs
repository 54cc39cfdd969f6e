//! Whole-program ordering check.
//!
//! Order numbers must form exactly the range 1..=N: no duplicates, no
//! gaps, nothing below 1. Instructions are returned sorted by order.

use crate::error::VerifyError;

/// Sort `items` by order and check that the orders are exactly 1..=N.
pub fn check_order<T>(mut items: Vec<(i64, T)>) -> Result<Vec<T>, VerifyError> {
    items.sort_by_key(|(order, _)| *order);

    let mut expected = 1i64;
    for (order, _) in &items {
        let order = *order;
        if order < 1 {
            return Err(VerifyError::InvalidOrder { order });
        }
        if order < expected {
            return Err(VerifyError::DuplicateOrder { order });
        }
        if order > expected {
            return Err(VerifyError::OrderGap { missing: expected });
        }
        expected += 1;
    }

    Ok(items.into_iter().map(|(_, item)| item).collect())
}
