//! Receipt
//!
//! Tabular rendering of the offers that apply to a cart. Every applied offer
//! gets its own block: one row per matched cart line showing how its units
//! were split, followed by the bundle and standard-price totals. Offers are
//! alternatives, so no grand total across offers is printed.

use std::{fmt::Write, io};

use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::SlotMap;
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    carts::{Cart, CartError, CartLineItem},
    offers::{OfferKey, OfferMeta, applications::AppliedOffer},
    pricing::TotalPriceError,
    products::{Product, ProductKey},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a total from cart lines.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// An applied offer refers to a line the cart does not have.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Error finding a product in the product catalog.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Applied offers for a cart, ready for display.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: Vec<CartLineItem<'a>>,
    applied: Vec<AppliedOffer<'a>>,
    subtotal: Money<'a, Currency>,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Create a receipt from a cart and the offers that apply to it.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the cart subtotal cannot be calculated.
    pub fn new(cart: &Cart<'a>, applied: Vec<AppliedOffer<'a>>) -> Result<Self, ReceiptError> {
        Ok(Self {
            lines: cart.iter().cloned().collect(),
            applied,
            subtotal: cart.subtotal()?,
            currency: cart.currency(),
        })
    }

    /// Cart value at standard prices
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Applied offers, in catalog order
    pub fn applied(&self) -> &[AppliedOffer<'a>] {
        &self.applied
    }

    /// Currency of the cart
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Writes the receipt as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a product is missing from `product_meta` or the
    /// receipt cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        product_meta: &SlotMap<ProductKey, Product<'_>>,
        offer_meta: &SlotMap<OfferKey, OfferMeta>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "", "Item", "Unit Price", "Bundled", "Standard", "Price", "Offer",
        ]);

        let mut writer = RowWriter {
            builder: &mut builder,
            color_ops: smallvec![],
            offer_boundary_rows: smallvec![],
            current_row: 1, // header is row 0
        };

        for applied in &self.applied {
            writer.append_offer(self, applied, product_meta, offer_meta)?;
        }

        let RowWriter {
            color_ops,
            offer_boundary_rows,
            ..
        } = writer;

        write_receipt_table(&mut out, builder, &offer_boundary_rows, color_ops)?;

        write_receipt_summary(&mut out, self)
    }
}

struct RowWriter<'b> {
    builder: &'b mut Builder,
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
    offer_boundary_rows: SmallVec<[usize; 16]>,
    current_row: usize,
}

impl RowWriter<'_> {
    fn append_offer(
        &mut self,
        receipt: &Receipt<'_>,
        applied: &AppliedOffer<'_>,
        product_meta: &SlotMap<ProductKey, Product<'_>>,
        offer_meta: &SlotMap<OfferKey, OfferMeta>,
    ) -> Result<(), ReceiptError> {
        let offer_name = offer_meta
            .get(applied.offer_key)
            .map_or("<unknown>", |meta| meta.name.as_str());

        self.offer_boundary_rows.push(self.current_row);

        for (row_idx, line_idx) in applied.matched.lines().iter().copied().enumerate() {
            let line = receipt
                .lines
                .get(line_idx)
                .ok_or(CartError::LineNotFound(line_idx))?;

            let product = product_meta
                .get(line.product())
                .ok_or(ReceiptError::MissingProduct(line.product()))?;

            let (bundled, standard) = applied.allocated_quantities(line_idx);

            self.push_row(
                [
                    format!("#{:<3}", line_idx + 1),
                    product.name.clone(),
                    format!("{}", line.unit_price()),
                    bundled.to_string(),
                    standard.to_string(),
                    String::new(),
                    if row_idx == 0 {
                        offer_name.to_string()
                    } else {
                        String::new()
                    },
                ],
                &[(2, color_dark_grey())],
            );
        }

        self.push_row(
            [
                String::new(),
                format!(
                    "{} x bundle @ {}",
                    applied.bundle_count,
                    applied.bundle_unit_price()
                ),
                String::new(),
                applied.bundled.quantity().to_string(),
                String::new(),
                format!("{}", applied.bundle_total),
                String::new(),
            ],
            &[(5, Color::FG_GREEN)],
        );

        if !applied.standard.is_empty() {
            self.push_row(
                [
                    String::new(),
                    "Standard price".to_string(),
                    String::new(),
                    String::new(),
                    applied.standard.quantity().to_string(),
                    format!("{}", applied.standard_total()),
                    String::new(),
                ],
                &[],
            );
        }

        // Savings only make sense when the bundle is priced in the cart currency.
        if let Ok(savings) = applied.savings() {
            self.push_row(
                [
                    String::new(),
                    "Savings".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    format!("-{savings}"),
                    String::new(),
                ],
                &[(5, color_dark_grey())],
            );
        }

        Ok(())
    }

    fn push_row(&mut self, record: [String; 7], colors: &[(usize, Color)]) {
        self.builder.push_record(record);

        for (col, color) in colors {
            self.color_ops.push((self.current_row, *col, color.clone()));
        }

        self.current_row += 1;
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    offer_boundary_rows: &[usize],
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in offer_boundary_rows {
        if row > 1 {
            theme.insert_horizontal_line(row, separator);
        }
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..6), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let subtotal = format!("{}", receipt.subtotal());
    let offers = receipt.applied().len().to_string();
    let width = subtotal.len().max(offers.len());

    writeln!(out, " Subtotal:  {subtotal:>width$}").map_err(|_err| ReceiptError::IO)?;
    writeln!(out, " \x1b[1mOffers:\x1b[0m    {offers:>width$}").map_err(|_err| ReceiptError::IO)?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
