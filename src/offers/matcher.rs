//! Offer Matching
//!
//! Narrows a cart down to the lines an offer can use. Filters are applied in
//! stages (membership, category, subcategory) and every stage must leave at
//! least one line, after which the surviving lines must hold enough units for
//! one bundle. Carousel offers are matched on membership alone.

use smallvec::SmallVec;

use crate::{
    carts::{Cart, CartLineItem},
    exclusions::Exclusion,
    offers::{Offer, OfferKind},
};

/// Cart lines an offer matched, as indexes in cart order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLines {
    lines: SmallVec<[usize; 10]>,
    quantity: u64,
}

impl MatchedLines {
    /// Cart line indexes, in cart order.
    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    /// Total units held by the matched lines.
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Number of matched lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line matched.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Match an offer's criteria against a cart.
///
/// # Errors
///
/// Returns the [`Exclusion`] naming the first stage that left no lines, or
/// [`Exclusion::BelowRequiredQuantity`] when the matched lines cannot form a
/// single bundle.
pub fn match_offer(offer: &Offer<'_>, cart: &Cart<'_>) -> Result<MatchedLines, Exclusion> {
    let mut lines: SmallVec<[(usize, &CartLineItem<'_>); 10]> = cart
        .iter()
        .enumerate()
        .filter(|(_, line)| offer.is_member(line.product()))
        .collect();

    if lines.is_empty() {
        return Err(Exclusion::NoMemberProducts);
    }

    if offer.kind() != OfferKind::Carousel {
        if let Some(category) = offer.category() {
            lines.retain(|(_, line)| line.category() == category);

            if lines.is_empty() {
                return Err(Exclusion::CategoryMismatch(category.to_string()));
            }
        }

        let subcategories = offer.subcategories();

        if !subcategories.is_empty() {
            lines.retain(|(_, line)| {
                line.subcategory()
                    .is_some_and(|sub| subcategories.iter().any(|wanted| wanted == sub))
            });

            if lines.is_empty() {
                return Err(Exclusion::SubcategoryMismatch(subcategories.to_vec()));
            }
        }
    }

    let quantity: u64 = lines.iter().map(|(_, line)| u64::from(line.quantity())).sum();
    let required = offer.required_quantity();

    if quantity < u64::from(required) {
        return Err(Exclusion::BelowRequiredQuantity {
            required,
            available: quantity,
        });
    }

    Ok(MatchedLines {
        lines: lines.iter().map(|(idx, _)| *idx).collect(),
        quantity,
    })
}
