use crate::models::{Currency, Decklist, PriceLookup};

use super::EngineError;

/// Sum of `count * price` over the decklist.
///
/// Cards missing from the lookup, or without a price in `currency`,
/// contribute nothing.
pub fn decklist_price(decklist: &Decklist, price_lookup: &PriceLookup, currency: Currency) -> f64 {
    decklist
        .iter()
        .filter_map(|(card_id, &count)| {
            price_lookup
                .get(card_id)
                .and_then(|card| card.price(currency))
                .map(|price| price * count as f64)
        })
        .sum()
}

/// Mean deck price over `decklists`.
pub fn average_price<'a>(
    decklists: impl IntoIterator<Item = &'a Decklist>,
    price_lookup: &PriceLookup,
    currency: Currency,
) -> Result<f64, EngineError> {
    let (sum, n) = decklists
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), decklist| {
            (sum + decklist_price(decklist, price_lookup, currency), n + 1)
        });
    if n == 0 {
        return Err(EngineError::EmptyInput("decklists to price"));
    }
    Ok(sum / n as f64)
}

/// Price of every non-empty decklist, in input order.
pub fn decklist_prices<'a>(
    decklists: impl IntoIterator<Item = &'a Decklist>,
    price_lookup: &PriceLookup,
    currency: Currency,
) -> Vec<f64> {
    decklists
        .into_iter()
        .filter(|decklist| !decklist.is_empty())
        .map(|decklist| decklist_price(decklist, price_lookup, currency))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::test_support::decklist;
    use crate::models::{price_lookup, CardPrice};

    fn lookup() -> PriceLookup {
        price_lookup(vec![
            CardPrice::new("A").with_eur(1.5).with_usd(2.0),
            CardPrice::new("B").with_eur(3.0),
        ])
    }

    #[test]
    fn test_decklist_price_eur() {
        let deck = decklist(&[("A", 2), ("B", 1)]);
        assert_eq!(decklist_price(&deck, &lookup(), Currency::Eur), 6.0);
    }

    #[test]
    fn test_decklist_price_missing_card() {
        let deck = decklist(&[("A", 2), ("B", 1)]);
        let only_a = price_lookup(vec![CardPrice::new("A").with_eur(1.5)]);
        assert_eq!(decklist_price(&deck, &only_a, Currency::Eur), 3.0);
    }

    #[test]
    fn test_decklist_price_missing_currency() {
        let deck = decklist(&[("A", 2), ("B", 1)]);
        assert_eq!(decklist_price(&deck, &lookup(), Currency::Usd), 4.0);
    }

    #[test]
    fn test_decklist_price_is_linear() {
        let deck = decklist(&[("A", 2), ("B", 1)]);
        let doubled = decklist(&[("A", 4), ("B", 2)]);
        let lookup = lookup();
        assert_eq!(
            decklist_price(&doubled, &lookup, Currency::Eur),
            2.0 * decklist_price(&deck, &lookup, Currency::Eur)
        );
    }

    #[test]
    fn test_average_price() {
        let decks = vec![decklist(&[("A", 2), ("B", 1)]), decklist(&[("B", 2)])];
        let avg = average_price(&decks, &lookup(), Currency::Eur).unwrap();
        assert_eq!(avg, 6.0);
    }

    #[test]
    fn test_average_price_empty_fails() {
        let decks: Vec<Decklist> = Vec::new();
        assert_eq!(
            average_price(&decks, &lookup(), Currency::Eur),
            Err(EngineError::EmptyInput("decklists to price"))
        );
    }

    #[test]
    fn test_decklist_prices_skips_empty() {
        let decks = vec![decklist(&[("A", 1)]), Decklist::new(), decklist(&[("B", 1)])];
        assert_eq!(
            decklist_prices(&decks, &lookup(), Currency::Eur),
            vec![1.5, 3.0]
        );
    }
}
