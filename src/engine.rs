//! Eligibility Engine
//!
//! Runs every offer of a catalog through validation, matching, price
//! resolution and allocation, keeping the offers that yield at least one
//! complete bundle. Offers are evaluated independently of each other and the
//! output keeps catalog order; choosing between overlapping offers is left to
//! the caller.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    allocation::allocate,
    carts::Cart,
    countries::{CountryKeys, CountryResolver},
    exclusions::Exclusion,
    offers::{Offer, OfferKey, OfferKind, applications::AppliedOffer, matcher::match_offer},
    pricing::resolve_bundle_price,
};

/// Outcome of evaluating one offer against a cart.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferEvaluation<'a> {
    /// The offer applies.
    Applied(AppliedOffer<'a>),

    /// The offer was left out.
    Excluded {
        /// Key of the excluded offer
        offer: OfferKey,

        /// Stage and reason that excluded it
        reason: Exclusion,
    },
}

impl<'a> OfferEvaluation<'a> {
    /// Key of the evaluated offer.
    pub fn offer_key(&self) -> OfferKey {
        match self {
            OfferEvaluation::Applied(applied) => applied.offer_key,
            OfferEvaluation::Excluded { offer, .. } => *offer,
        }
    }

    /// The application, if the offer applies.
    pub fn applied(&self) -> Option<&AppliedOffer<'a>> {
        match self {
            OfferEvaluation::Applied(applied) => Some(applied),
            OfferEvaluation::Excluded { .. } => None,
        }
    }

    /// The exclusion reason, if the offer was left out.
    pub fn exclusion(&self) -> Option<&Exclusion> {
        match self {
            OfferEvaluation::Applied(_) => None,
            OfferEvaluation::Excluded { reason, .. } => Some(reason),
        }
    }
}

/// Offer eligibility engine
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    resolver: CountryResolver,
}

impl EligibilityEngine {
    /// Create an engine using the given country code table.
    pub fn new(resolver: CountryResolver) -> Self {
        Self { resolver }
    }

    /// The country resolver in use.
    pub fn resolver(&self) -> &CountryResolver {
        &self.resolver
    }

    /// Return the offers that apply to the cart, in catalog order.
    #[tracing::instrument(
        name = "engine.resolve_applicable_offers",
        skip_all,
        fields(
            line_count = cart.len(),
            offer_count = offers.len(),
            country = %country_hint
        )
    )]
    pub fn resolve_applicable_offers<'a>(
        &self,
        cart: &Cart<'a>,
        offers: &[Offer<'a>],
        country_hint: &str,
    ) -> Vec<AppliedOffer<'a>> {
        let applied: Vec<AppliedOffer<'a>> = self
            .evaluate(cart, offers, country_hint)
            .into_iter()
            .filter_map(|evaluation| match evaluation {
                OfferEvaluation::Applied(applied) => Some(applied),
                OfferEvaluation::Excluded { .. } => None,
            })
            .collect();

        info!(applied = applied.len(), "resolved applicable offers");

        applied
    }

    /// Evaluate every offer against the cart, in catalog order, keeping the
    /// reason for each exclusion.
    pub fn evaluate<'a>(
        &self,
        cart: &Cart<'a>,
        offers: &[Offer<'a>],
        country_hint: &str,
    ) -> Vec<OfferEvaluation<'a>> {
        let keys = self.resolver.resolve(country_hint);

        #[cfg(feature = "parallel")]
        let offers = offers.par_iter();

        #[cfg(not(feature = "parallel"))]
        let offers = offers.iter();

        offers
            .map(|offer| evaluation(offer, self.evaluate_offer(cart, offer, &keys)))
            .collect()
    }

    /// Run a single offer through every stage.
    ///
    /// # Errors
    ///
    /// Returns the [`Exclusion`] of the first stage that rejected the offer.
    pub fn evaluate_offer<'a>(
        &self,
        cart: &Cart<'a>,
        offer: &Offer<'a>,
        keys: &CountryKeys,
    ) -> Result<AppliedOffer<'a>, Exclusion> {
        offer.validate()?;

        if offer.kind() == OfferKind::Coupon {
            return Err(Exclusion::CouponOffer);
        }

        let matched = match_offer(offer, cart)?;
        let price = resolve_bundle_price(offer, keys)?;
        let allocation = allocate(
            cart,
            matched.lines(),
            offer.required_quantity(),
            price.unit_price,
        )?;

        if allocation.bundle_count == 0 {
            return Err(Exclusion::NoCompleteBundle);
        }

        Ok(AppliedOffer::new(offer.key(), matched, price, allocation))
    }
}

fn evaluation<'a>(
    offer: &Offer<'a>,
    result: Result<AppliedOffer<'a>, Exclusion>,
) -> OfferEvaluation<'a> {
    match result {
        Ok(applied) => {
            debug!(
                offer = ?offer.key(),
                bundles = applied.bundle_count,
                "offer applies"
            );

            OfferEvaluation::Applied(applied)
        }
        Err(reason) => {
            if let Exclusion::InvalidOffer(err) = &reason {
                warn!(offer = ?offer.key(), error = %err, "skipping invalid offer");
            } else {
                debug!(offer = ?offer.key(), %reason, "offer excluded");
            }

            OfferEvaluation::Excluded {
                offer: offer.key(),
                reason,
            }
        }
    }
}

/// Return the offers that apply to the cart using the built-in country table.
pub fn resolve_applicable_offers<'a>(
    cart: &Cart<'a>,
    offers: &[Offer<'a>],
    country_hint: &str,
) -> Vec<AppliedOffer<'a>> {
    EligibilityEngine::default().resolve_applicable_offers(cart, offers, country_hint)
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, INR},
    };
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        carts::{CartError, CartLineItem},
        offers::{CountryPrice, OfferError},
        pricing::PriceSource,
        products::ProductKey,
    };

    use super::*;

    struct Setup {
        product: ProductKey,
        offer_keys: SlotMap<OfferKey, ()>,
    }

    fn setup() -> Setup {
        let mut products = SlotMap::<ProductKey, ()>::with_key();

        Setup {
            product: products.insert(()),
            offer_keys: SlotMap::with_key(),
        }
    }

    fn cart(product: ProductKey, quantity: u32) -> Result<Cart<'static>, CartError> {
        Cart::with_items(
            [CartLineItem::new(
                product,
                quantity,
                Money::from_minor(400, GBP),
                "Men",
                Some("t-shirts".to_string()),
            )],
            GBP,
        )
    }

    fn bundle(setup: &mut Setup, required: u32) -> Offer<'static> {
        Offer::new(
            setup.offer_keys.insert(()),
            OfferKind::Bundle,
            [setup.product],
            Money::from_minor(700, GBP),
        )
        .with_required_quantity(required)
    }

    #[test]
    fn applies_offers_in_catalog_order() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 4)?;
        let offers = [bundle(&mut setup, 2), bundle(&mut setup, 4)];

        let applied = EligibilityEngine::default().resolve_applicable_offers(&cart, &offers, "");

        let keys: Vec<OfferKey> = applied.iter().map(|applied| applied.offer_key).collect();
        let expected: Vec<OfferKey> = offers.iter().map(Offer::key).collect();

        assert_eq!(keys, expected);

        Ok(())
    }

    #[test]
    fn coupons_are_skipped() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 4)?;
        let coupon = Offer::new(
            setup.offer_keys.insert(()),
            OfferKind::Coupon,
            [setup.product],
            Money::from_minor(100, GBP),
        );

        let evaluations = EligibilityEngine::default().evaluate(&cart, &[coupon], "");

        assert_eq!(
            evaluations.first().and_then(OfferEvaluation::exclusion),
            Some(&Exclusion::CouponOffer)
        );

        Ok(())
    }

    #[test]
    fn invalid_offers_are_excluded_without_stopping_the_rest() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 4)?;
        let offers = [bundle(&mut setup, 0), bundle(&mut setup, 2)];

        let evaluations = EligibilityEngine::default().evaluate(&cart, &offers, "");

        assert_eq!(evaluations.len(), 2);
        assert_eq!(
            evaluations.first().and_then(OfferEvaluation::exclusion),
            Some(&Exclusion::InvalidOffer(
                OfferError::InvalidRequiredQuantity(0)
            ))
        );
        assert!(
            evaluations
                .get(1)
                .and_then(OfferEvaluation::applied)
                .is_some()
        );

        Ok(())
    }

    #[test]
    fn country_gate_excludes_unlisted_markets() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 4)?;
        let offer = bundle(&mut setup, 2)
            .with_country_price(CountryPrice::new("India", Money::from_minor(50000, INR)));

        let engine = EligibilityEngine::default();

        assert!(
            engine
                .resolve_applicable_offers(&cart, std::slice::from_ref(&offer), "Germany")
                .is_empty()
        );
        assert_eq!(
            engine
                .resolve_applicable_offers(&cart, std::slice::from_ref(&offer), "IN")
                .len(),
            1
        );

        Ok(())
    }

    #[test]
    fn custom_country_table_is_used() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 2)?;
        let offer = bundle(&mut setup, 2)
            .with_country_price(CountryPrice::new("Bharat", Money::from_minor(45000, INR)));

        let engine = EligibilityEngine::new(CountryResolver::new([("IN", "Bharat")]));
        let applied = engine.resolve_applicable_offers(&cart, &[offer], "in");

        assert_eq!(
            applied.first().map(AppliedOffer::bundle_unit_price),
            Some(Money::from_minor(45000, INR))
        );

        Ok(())
    }

    #[test]
    fn evaluation_accessors_report_key_and_outcome() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 1)?;
        let offer = bundle(&mut setup, 2);
        let key = offer.key();

        let evaluations = EligibilityEngine::default().evaluate(&cart, &[offer], "");
        let evaluation = evaluations.first().ok_or("missing evaluation")?;

        assert_eq!(evaluation.offer_key(), key);
        assert!(evaluation.applied().is_none());
        assert!(matches!(
            evaluation.exclusion(),
            Some(Exclusion::BelowRequiredQuantity {
                required: 2,
                available: 1
            })
        ));

        Ok(())
    }

    #[test]
    fn free_function_uses_the_default_table() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 3)?;
        let offer = bundle(&mut setup, 2)
            .with_country_price(CountryPrice::new("India", Money::from_minor(50000, INR)));

        let applied = resolve_applicable_offers(&cart, &[offer], "IN");

        assert_eq!(applied.len(), 1);

        Ok(())
    }

    #[test]
    fn evaluations_can_be_cloned() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 2)?;
        let offers = [bundle(&mut setup, 0), bundle(&mut setup, 3), bundle(&mut setup, 2)];

        let evaluations = EligibilityEngine::default().evaluate(&cart, &offers, "");
        let copies = evaluations.clone();

        assert_eq!(copies, evaluations);
        assert_eq!(
            copies.first().and_then(OfferEvaluation::exclusion).cloned(),
            Some(Exclusion::InvalidOffer(OfferError::InvalidRequiredQuantity(0)))
        );

        Ok(())
    }

    #[test]
    fn two_letter_hint_applies_through_a_partial_name_match() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 2)?;
        let offer = bundle(&mut setup, 2)
            .with_country_price(CountryPrice::new("Jordan", Money::from_minor(600, GBP)));

        let applied = resolve_applicable_offers(&cart, &[offer], "JO");
        let applied = applied.first().ok_or("offer should apply")?;

        assert_eq!(applied.price.source, PriceSource::Partial);
        assert_eq!(applied.bundle_unit_price(), Money::from_minor(600, GBP));

        Ok(())
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_evaluation_keeps_catalog_order() -> TestResult {
        let mut setup = setup();
        let cart = cart(setup.product, 12)?;
        let offers: Vec<Offer<'static>> = (0..50).map(|i| bundle(&mut setup, 1 + i % 4)).collect();

        let expected: Vec<OfferKey> = offers.iter().map(Offer::key).collect();

        for _ in 0..5 {
            let evaluations = EligibilityEngine::default().evaluate(&cart, &offers, "");
            let keys: Vec<OfferKey> = evaluations.iter().map(OfferEvaluation::offer_key).collect();

            assert_eq!(keys, expected);

            let applied = EligibilityEngine::default().resolve_applicable_offers(&cart, &offers, "");
            let applied_keys: Vec<OfferKey> =
                applied.iter().map(|applied| applied.offer_key).collect();

            assert_eq!(applied_keys, expected);
        }

        Ok(())
    }
}
