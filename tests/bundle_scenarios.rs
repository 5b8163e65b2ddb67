//! Bundle pricing scenarios run end to end through the eligibility engine.
//!
//! Each test builds a small catalog by hand, so the expected splits can be
//! read straight off the setup:
//!
//! 1. Three units of one product, a 2-unit bundle priced for India only.
//!    A hint of `IN` resolves to India: one bundle of two units at 500 INR,
//!    one unit left at its standard price.
//! 2. The same offer with a hint of `Germany` is excluded outright.
//! 3. A 3-unit carousel over two products takes both units of the first line
//!    and then the single unit of the second.

use rusty_money::{
    Money,
    iso::{Currency, INR},
};
use slotmap::SlotMap;
use testresult::TestResult;

use trellis::prelude::*;

struct Catalog {
    products: SlotMap<ProductKey, Product<'static>>,
    offers: SlotMap<OfferKey, OfferMeta>,
}

impl Catalog {
    fn new() -> Self {
        Self {
            products: SlotMap::with_key(),
            offers: SlotMap::with_key(),
        }
    }

    fn product(&mut self, name: &str, category: &str, subcategory: &str, minor: i64) -> ProductKey {
        self.products.insert(
            Product::new(name, category, Money::from_minor(minor, INR)).with_subcategory(subcategory),
        )
    }

    fn offer_key(&mut self, name: &str) -> OfferKey {
        self.offers.insert(OfferMeta {
            name: name.to_string(),
        })
    }

    fn cart(&self, lines: &[(ProductKey, u32)]) -> Result<Cart<'static>, CartError> {
        let lines: Vec<CartLineItem<'static>> = lines
            .iter()
            .enumerate()
            .map(|(idx, (key, quantity))| {
                self.products
                    .get(*key)
                    .map(|product| CartLineItem::from_product(*key, product, *quantity))
                    .ok_or(CartError::LineNotFound(idx))
            })
            .collect::<Result<_, _>>()?;

        Cart::with_items(lines, INR)
    }
}

fn inr(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, INR)
}

fn india_bundle(catalog: &mut Catalog, product: ProductKey) -> Offer<'static> {
    let key = catalog.offer_key("Any 2 for 500");

    Offer::new(key, OfferKind::Bundle, [product], inr(90_000))
        .with_required_quantity(2)
        .with_country_price(CountryPrice::new("India", inr(50_000)))
}

fn split(group: &AllocatedGroup<'_>) -> Vec<(usize, u32)> {
    group
        .lines()
        .iter()
        .map(|line| (line.line_idx, line.quantity))
        .collect()
}

#[test]
fn india_hint_forms_one_bundle_and_leaves_one_unit() -> TestResult {
    let mut catalog = Catalog::new();
    let product = catalog.product("Kurta", "Men", "ethnic", 30_000);
    let cart = catalog.cart(&[(product, 3)])?;
    let offer = india_bundle(&mut catalog, product);

    let applied = resolve_applicable_offers(&cart, &[offer], "IN");

    assert_eq!(applied.len(), 1);

    let applied = applied.first().ok_or("missing applied offer")?;

    assert_eq!(applied.bundle_count, 1);
    assert_eq!(applied.bundle_unit_price(), inr(50_000));
    assert_eq!(applied.price.source, PriceSource::ExactExpansion);
    assert_eq!(applied.allocated_quantities(0), (2, 1));
    assert_eq!(applied.bundle_total, inr(50_000));
    assert_eq!(applied.standard_total(), inr(30_000));
    assert_eq!(applied.bundled_original_total(), inr(60_000));
    assert_eq!(applied.savings()?, inr(10_000));

    Ok(())
}

#[test]
fn unlisted_country_excludes_the_offer() -> TestResult {
    let mut catalog = Catalog::new();
    let product = catalog.product("Kurta", "Men", "ethnic", 30_000);
    let cart = catalog.cart(&[(product, 3)])?;
    let offer = india_bundle(&mut catalog, product);

    let engine = EligibilityEngine::default();

    assert!(
        engine
            .resolve_applicable_offers(&cart, std::slice::from_ref(&offer), "Germany")
            .is_empty()
    );

    let evaluations = engine.evaluate(&cart, &[offer], "Germany");

    assert_eq!(
        evaluations.first().and_then(OfferEvaluation::exclusion),
        Some(&Exclusion::CountryNotListed("germany".to_string()))
    );

    Ok(())
}

#[test]
fn empty_hint_never_matches_a_country_table() -> TestResult {
    let mut catalog = Catalog::new();
    let product = catalog.product("Kurta", "Men", "ethnic", 30_000);
    let cart = catalog.cart(&[(product, 4)])?;
    let offer = india_bundle(&mut catalog, product);

    assert!(resolve_applicable_offers(&cart, &[offer], "").is_empty());

    Ok(())
}

#[test]
fn carousel_fills_bundles_in_cart_order() -> TestResult {
    let mut catalog = Catalog::new();
    let first = catalog.product("Linen Shirt", "Men", "shirts", 20_000);
    let second = catalog.product("Silk Scarf", "Women", "accessories", 15_000);
    let cart = catalog.cart(&[(first, 2), (second, 1)])?;

    let key = catalog.offer_key("Festive carousel");
    let offer = Offer::new(key, OfferKind::Carousel, [first, second], inr(45_000))
        .with_required_quantity(3)
        .with_category("Kids");

    let applied = resolve_applicable_offers(&cart, &[offer], "");
    let applied = applied.first().ok_or("carousel should apply")?;

    assert_eq!(applied.bundle_count, 1);
    assert_eq!(split(&applied.bundled), vec![(0, 2), (1, 1)]);
    assert!(applied.standard.is_empty());
    assert_eq!(applied.bundle_total, inr(45_000));

    Ok(())
}

#[test]
fn category_and_subcategory_filters_combine() -> TestResult {
    let mut catalog = Catalog::new();
    let mens_tee = catalog.product("Crew Tee", "Men", "t-shirts", 1_000);
    let womens_tee = catalog.product("Boxy Tee", "Women", "t-shirts", 1_000);
    let mens_polo = catalog.product("Pique Polo", "Men", "polos", 1_000);
    let cart = catalog.cart(&[(mens_tee, 1), (womens_tee, 1), (mens_polo, 1)])?;

    let members = [mens_tee, womens_tee, mens_polo];

    let key = catalog.offer_key("Men's tees");
    let single = Offer::new(key, OfferKind::Bundle, members, inr(500))
        .with_category("Men")
        .with_subcategories(["t-shirts"]);

    let key = catalog.offer_key("Two men's tees");
    let pair = Offer::new(key, OfferKind::Bundle, members, inr(900))
        .with_required_quantity(2)
        .with_category("Men")
        .with_subcategories(["t-shirts"]);

    let evaluations = EligibilityEngine::default().evaluate(&cart, &[single, pair], "");

    let matched = evaluations
        .first()
        .and_then(OfferEvaluation::applied)
        .map(|applied| applied.matched.lines().to_vec());

    assert_eq!(matched, Some(vec![0]));
    assert_eq!(
        evaluations.get(1).and_then(OfferEvaluation::exclusion),
        Some(&Exclusion::BelowRequiredQuantity {
            required: 2,
            available: 1
        })
    );

    Ok(())
}

#[test]
fn quantities_are_conserved_for_every_applied_offer() -> TestResult {
    let mut catalog = Catalog::new();
    let a = catalog.product("A", "Men", "t-shirts", 1_000);
    let b = catalog.product("B", "Men", "t-shirts", 1_500);
    let c = catalog.product("C", "Men", "polos", 2_000);
    let cart = catalog.cart(&[(a, 5), (c, 2), (b, 4)])?;

    let offers: Vec<Offer<'static>> = (1..=11)
        .map(|required| {
            let key = catalog.offer_key(&format!("{required} for less"));

            Offer::new(key, OfferKind::Carousel, [a, b, c], inr(100))
                .with_required_quantity(required)
        })
        .collect();

    let applied = resolve_applicable_offers(&cart, &offers, "");

    assert_eq!(applied.len(), offers.len());

    for (offer, applied) in offers.iter().zip(&applied) {
        let required = u64::from(offer.required_quantity());

        for (idx, line) in cart.iter().enumerate() {
            let (bundled, standard) = applied.allocated_quantities(idx);

            assert_eq!(
                bundled + standard,
                line.quantity(),
                "line {idx} not conserved for required quantity {required}"
            );
        }

        assert_eq!(applied.bundle_count, 11 / required, "bundle count for {required}");
        assert_eq!(
            applied.bundled.quantity(),
            applied.bundle_count * required,
            "bundled units for {required}"
        );
    }

    Ok(())
}

#[test]
fn repeated_evaluation_is_deterministic() -> TestResult {
    let mut catalog = Catalog::new();
    let a = catalog.product("A", "Men", "t-shirts", 1_000);
    let b = catalog.product("B", "Women", "dresses", 2_500);
    let cart = catalog.cart(&[(b, 1), (a, 3), (b, 2)])?;

    let key = catalog.offer_key("Mixed");
    let mixed = Offer::new(key, OfferKind::Carousel, [a, b], inr(3_000))
        .with_required_quantity(4)
        .with_country_price(CountryPrice::new("United Arab Emirates", inr(2_000)))
        .with_country_price(CountryPrice::new("India", inr(2_500)));

    let key = catalog.offer_key("Dresses");
    let dresses = Offer::new(key, OfferKind::Bundle, [b], inr(4_000))
        .with_required_quantity(2)
        .with_category("Women");

    let offers = [mixed, dresses];

    let first = resolve_applicable_offers(&cart, &offers, "india");

    for _ in 0..10 {
        assert_eq!(resolve_applicable_offers(&cart, &offers, "india"), first);
    }

    assert_eq!(first.len(), 2);

    Ok(())
}

#[test]
fn exact_match_further_down_beats_an_earlier_partial_match() -> TestResult {
    let mut catalog = Catalog::new();
    let product = catalog.product("Kurta", "Men", "ethnic", 30_000);
    let cart = catalog.cart(&[(product, 2)])?;

    let key = catalog.offer_key("Regional pricing");
    let offer = Offer::new(key, OfferKind::Bundle, [product], inr(90_000))
        .with_required_quantity(2)
        .with_country_price(CountryPrice::new("British Indian Ocean Territory", inr(70_000)))
        .with_country_price(CountryPrice::new("India", inr(50_000)));

    let applied = resolve_applicable_offers(&cart, &[offer], "India");
    let applied = applied.first().ok_or("offer should apply")?;

    assert_eq!(applied.bundle_unit_price(), inr(50_000));
    assert_eq!(applied.price.source, PriceSource::ExactHint);

    Ok(())
}

#[test]
fn coupons_and_invalid_offers_do_not_block_the_catalog() -> TestResult {
    let mut catalog = Catalog::new();
    let product = catalog.product("Kurta", "Men", "ethnic", 30_000);
    let cart = catalog.cart(&[(product, 2)])?;

    let key = catalog.offer_key("Coupon");
    let coupon = Offer::new(key, OfferKind::Coupon, [product], inr(5_000));

    let key = catalog.offer_key("Broken");
    let broken = Offer::new(key, OfferKind::Bundle, [product], inr(-1));

    let key = catalog.offer_key("Pair");
    let pair = Offer::new(key, OfferKind::Bundle, [product], inr(50_000)).with_required_quantity(2);
    let pair_key = pair.key();

    let applied = resolve_applicable_offers(&cart, &[coupon, broken, pair], "");

    assert_eq!(
        applied.iter().map(|applied| applied.offer_key).collect::<Vec<_>>(),
        vec![pair_key]
    );

    Ok(())
}
