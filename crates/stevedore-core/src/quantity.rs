//! Strict resource-quantity grammar
//!
//! Accepts a numeric value with an optional SI or binary suffix, e.g.
//! `512`, `0.5`, `256Mi`, `2G`, `100m`. Anything else is rejected so a
//! typo like `512MB` fails at validation time rather than at the control
//! plane.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{CoreError, Result};

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?(m|k|M|G|T|P|E|Ki|Mi|Gi|Ti|Pi|Ei)?$").expect("valid regex")
});

/// Validate a quantity string against the strict grammar.
pub fn parse_quantity(quantity: &str) -> Result<()> {
    if QUANTITY.is_match(quantity) {
        Ok(())
    } else {
        Err(CoreError::InvalidQuantity {
            quantity: quantity.to_string(),
        })
    }
}
