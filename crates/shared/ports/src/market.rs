use std::rc::Rc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tempo_core::{InstrumentId, Price, Quantity};

/// One side of the top of book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Quantity,
}

impl BookLevel {
    pub fn new(price: Price, size: Quantity) -> Self {
        Self { price, size }
    }
}

/// Best bid / best ask for an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopOfBook {
    pub bid: Option<BookLevel>,
    pub ask: Option<BookLevel>,
}

impl TopOfBook {
    pub fn new(bid: Option<BookLevel>, ask: Option<BookLevel>) -> Self {
        Self { bid, ask }
    }

    /// Midpoint between best bid and best ask
    pub fn mid_price(&self) -> Option<Price> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid.price + ask.price) / Decimal::TWO),
            _ => None,
        }
    }

    /// Both sides present
    pub fn is_two_sided(&self) -> bool {
        self.bid.is_some() && self.ask.is_some()
    }
}

/// Port for read-only market state maintained by the platform
pub trait MarketView {
    /// Reference price used for aggressive pricing (midpoint by default)
    fn reference_price(&self, instrument: &InstrumentId) -> Option<Price>;

    /// Current top of book, if the book has been seen at all
    fn best_market(&self, instrument: &InstrumentId) -> Option<TopOfBook>;
}

impl<M: MarketView + ?Sized> MarketView for Rc<M> {
    fn reference_price(&self, instrument: &InstrumentId) -> Option<Price> {
        (**self).reference_price(instrument)
    }

    fn best_market(&self, instrument: &InstrumentId) -> Option<TopOfBook> {
        (**self).best_market(instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mid_price_requires_both_sides() {
        let book = TopOfBook::new(
            Some(BookLevel::new(dec!(99.5), 10)),
            Some(BookLevel::new(dec!(100.5), 20)),
        );
        assert_eq!(book.mid_price(), Some(dec!(100)));
        assert!(book.is_two_sided());

        let one_sided = TopOfBook::new(Some(BookLevel::new(dec!(99.5), 10)), None);
        assert_eq!(one_sided.mid_price(), None);
        assert!(!one_sided.is_two_sided());
    }
}
