//! # Cart Store
//!
//! The in-memory cart as a pure reducer over typed actions.
//!
//! ## Reducer Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Reducer                                       │
//! │                                                                         │
//! │  Action                     Lines                      Total            │
//! │  ──────                     ─────                      ─────            │
//! │                                                                         │
//! │  Add(book) ───────────────► qty += 1 or push(book, 1)  ┐               │
//! │                                                         │               │
//! │  Remove(id) ──────────────► retain(id != book.id)      │  recompute    │
//! │                                                         ├─► from the    │
//! │  SetQuantity{id, q} ──────► q <= 0: remove             │  new lines    │
//! │                             else qty = q               │               │
//! │                                                         │               │
//! │  Clear ───────────────────► []                         ┘               │
//! │                                                                         │
//! │  (state, action) ──► new state. No clock, no I/O, no failure.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The total has no setter. It is rebuilt from the line list every time a
//! new `Cart` value is produced, so it cannot drift from the lines.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Book, BookId};
use crate::{MAX_LINE_QUANTITY, STOREWIDE_MARKDOWN_BPS};

// =============================================================================
// Cart Line
// =============================================================================

/// One book and how many copies of it.
///
/// The book is copied in, so an order snapshot taken from these lines is
/// unaffected by later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub book: Book,
    /// Always within `1..=MAX_LINE_QUANTITY` inside a `Cart`.
    #[ts(type = "number")]
    pub quantity: i64,
}

impl CartLine {
    pub fn new(book: Book, quantity: i64) -> Self {
        CartLine { book, quantity }
    }

    pub fn book_id(&self) -> BookId {
        self.book.id
    }

    /// List price × quantity, before the storewide markdown.
    pub fn list_total(&self) -> Money {
        self.book.price().multiply_quantity(self.quantity)
    }

    /// What the customer pays for this line.
    pub fn line_total(&self) -> Money {
        self.list_total().apply_markdown(STOREWIDE_MARKDOWN_BPS)
    }
}

// =============================================================================
// Cart Actions
// =============================================================================

/// The four ways a cart can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one copy of a book.
    Add(Book),
    /// Drop a book's line entirely. No-op when absent.
    Remove(BookId),
    /// Replace a line's quantity. Values at or below zero remove the line,
    /// values above [`MAX_LINE_QUANTITY`] are clamped to it.
    SetQuantity { book_id: BookId, quantity: i64 },
    /// Empty the cart.
    Clear,
}

// =============================================================================
// Cart
// =============================================================================

/// The cart: lines in insertion order plus their derived total.
///
/// ## Invariants
/// - At most one line per book id
/// - Every line has `1 <= quantity <= MAX_LINE_QUANTITY`
/// - `total == Σ line.line_total()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    total: Money,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from arbitrary lines.
    ///
    /// Duplicate book ids are merged into the first occurrence, lines with
    /// a non-positive quantity are dropped, and merged quantities are capped.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut merged: Vec<CartLine> = Vec::new();
        for line in lines {
            if line.quantity <= 0 {
                continue;
            }
            match merged.iter_mut().find(|l| l.book_id() == line.book_id()) {
                Some(existing) => {
                    existing.quantity = clamp_quantity(existing.quantity.saturating_add(line.quantity))
                }
                None => merged.push(CartLine::new(line.book, clamp_quantity(line.quantity))),
            }
        }
        Self::with_lines(merged)
    }

    /// The one place a `Cart` is assembled; the total is always derived here.
    fn with_lines(lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(CartLine::line_total).sum();
        Cart { lines, total }
    }

    /// Pure reducer: returns the successor state for `action`.
    pub fn reduce(&self, action: CartAction) -> Cart {
        let mut lines = self.lines.clone();
        match action {
            CartAction::Add(book) => match lines.iter_mut().find(|l| l.book_id() == book.id) {
                Some(line) => line.quantity = clamp_quantity(line.quantity.saturating_add(1)),
                None => lines.push(CartLine::new(book, 1)),
            },
            CartAction::Remove(book_id) => lines.retain(|l| l.book_id() != book_id),
            CartAction::SetQuantity { book_id, quantity } => {
                let quantity = clamp_quantity(quantity);
                if quantity == 0 {
                    lines.retain(|l| l.book_id() != book_id);
                } else if let Some(line) = lines.iter_mut().find(|l| l.book_id() == book_id) {
                    line.quantity = quantity;
                }
            }
            CartAction::Clear => lines.clear(),
        }
        Self::with_lines(lines)
    }

    /// Applies `action` in place.
    pub fn dispatch(&mut self, action: CartAction) {
        *self = self.reduce(action);
    }

    pub fn add(&mut self, book: Book) {
        self.dispatch(CartAction::Add(book));
    }

    pub fn remove(&mut self, book_id: BookId) {
        self.dispatch(CartAction::Remove(book_id));
    }

    pub fn set_quantity(&mut self, book_id: BookId, quantity: i64) {
        self.dispatch(CartAction::SetQuantity { book_id, quantity });
    }

    pub fn clear(&mut self) {
        self.dispatch(CartAction::Clear);
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Derived total after the storewide markdown.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct books.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of copies across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Quantity held for `book_id`, 0 when absent.
    pub fn quantity_of(&self, book_id: BookId) -> i64 {
        self.lines
            .iter()
            .find(|l| l.book_id() == book_id)
            .map_or(0, |l| l.quantity)
    }

    /// Owned copy of the lines, for freezing into an order.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }
}

fn clamp_quantity(quantity: i64) -> i64 {
    quantity.clamp(0, MAX_LINE_QUANTITY)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: BookId, price_cents: i64) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "Author".to_string(),
            category: "Fiction".to_string(),
            price_cents,
            pages: 200,
            language: "English".to_string(),
            description: String::new(),
            image: String::new(),
            isbn: format!("978000000000{}", id),
        }
    }

    fn derived_total(cart: &Cart) -> Money {
        cart.lines()
            .iter()
            .map(|l| l.book.price().multiply_quantity(l.quantity).apply_markdown(5000))
            .sum()
    }

    #[test]
    fn test_add_same_book_twice() {
        // ₹200 list price, 50% markdown
        let x = book(1, 20000);
        let mut cart = Cart::new();

        cart.add(x.clone());
        assert_eq!(cart.total(), Money::from_cents(10000));

        cart.add(x);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of(1), 2);
        assert_eq!(cart.total(), Money::from_cents(20000));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(book(3, 1000));
        cart.add(book(1, 1000));
        cart.add(book(3, 1000));

        let ids: Vec<BookId> = cart.lines().iter().map(CartLine::book_id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_set_quantity_zero_and_negative_remove_line() {
        let mut cart = Cart::new();
        cart.add(book(1, 1000));
        cart.add(book(2, 1000));

        cart.set_quantity(1, 0);
        assert_eq!(cart.quantity_of(1), 0);
        assert_eq!(cart.line_count(), 1);

        cart.set_quantity(2, -4);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_huge_quantities_are_capped() {
        let mut cart = Cart::new();
        cart.add(book(1, 20000));

        cart.set_quantity(1, i64::MAX);
        assert_eq!(cart.quantity_of(1), MAX_LINE_QUANTITY);

        cart.add(book(1, 20000));
        assert_eq!(cart.quantity_of(1), MAX_LINE_QUANTITY);
        assert_eq!(cart.total(), derived_total(&cart));
        assert_eq!(cart.total(), Money::from_cents(10000 * MAX_LINE_QUANTITY));
        assert!(cart.total().is_positive());
    }

    #[test]
    fn test_from_lines_caps_merged_quantity() {
        let cart = Cart::from_lines(vec![
            CartLine::new(book(1, 100), i64::MAX),
            CartLine::new(book(1, 100), i64::MAX),
        ]);
        assert_eq!(cart.quantity_of(1), MAX_LINE_QUANTITY);
        assert_eq!(cart.total(), derived_total(&cart));
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut cart = Cart::new();
        cart.add(book(1, 30000));
        cart.set_quantity(1, 5);
        assert_eq!(cart.quantity_of(1), 5);
        assert_eq!(cart.total(), Money::from_cents(75000));
    }

    #[test]
    fn test_set_quantity_on_missing_book_is_noop() {
        let mut cart = Cart::new();
        cart.add(book(1, 1000));
        let before = cart.clone();
        cart.set_quantity(99, 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add(book(1, 1000));
        let before = cart.clone();
        cart.remove(42);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_reduce_is_pure() {
        let start = Cart::new().reduce(CartAction::Add(book(1, 1000)));
        let a = start.reduce(CartAction::Add(book(2, 2500)));
        let b = start.reduce(CartAction::Add(book(2, 2500)));
        assert_eq!(a, b);
        // the source state is not touched
        assert_eq!(start.line_count(), 1);
    }

    #[test]
    fn test_total_tracks_lines_through_any_sequence() {
        let books = [book(1, 19900), book(2, 34950), book(3, 1)];
        let actions = vec![
            CartAction::Add(books[0].clone()),
            CartAction::Add(books[1].clone()),
            CartAction::Add(books[0].clone()),
            CartAction::SetQuantity { book_id: 2, quantity: 7 },
            CartAction::Add(books[2].clone()),
            CartAction::Remove(1),
            CartAction::SetQuantity { book_id: 3, quantity: 3 },
            CartAction::Add(books[0].clone()),
            CartAction::SetQuantity { book_id: 2, quantity: -1 },
            CartAction::Clear,
            CartAction::Add(books[1].clone()),
        ];

        let mut cart = Cart::new();
        for action in actions {
            cart.dispatch(action);
            assert_eq!(cart.total(), derived_total(&cart));
            assert!(cart
                .lines()
                .iter()
                .all(|l| (1..=MAX_LINE_QUANTITY).contains(&l.quantity)));
        }
    }

    #[test]
    fn test_clear_resets() {
        let mut cart = Cart::new();
        cart.add(book(1, 1000));
        cart.clear();
        assert_eq!(cart, Cart::new());
    }

    #[test]
    fn test_from_lines_merges_and_drops() {
        let cart = Cart::from_lines(vec![
            CartLine::new(book(1, 1000), 2),
            CartLine::new(book(2, 1000), 0),
            CartLine::new(book(1, 1000), 1),
        ]);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of(1), 3);
        assert_eq!(cart.total(), Money::from_cents(1500));
        assert_eq!(cart.total_quantity(), 3);
    }
}
