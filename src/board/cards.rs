//! Chance and Community Chest card texts.
//!
//! The decks are carried as data for display and analysis only. Landing on
//! a Chance or Community Chest square is a pass-through: the engine never
//! draws a card or mutates state, so a consumer rendering card texts does
//! not perturb the RNG call sequence.

/// Chance deck texts.
pub const CHANCE_CARDS: [&str; 16] = [
    "Advance to Go (Collect $200)",
    "Advance to Illinois Ave.",
    "Advance to St. Charles Place",
    "Advance token to nearest Railroad",
    "Advance token to nearest Utility",
    "Bank pays you dividend of $50",
    "Get Out of Jail Free",
    "Go Back 3 Spaces",
    "Go to Jail. Go directly to Jail.",
    "Make general repairs on all your property - $25 per house, $100 per hotel",
    "Pay poor tax of $15",
    "Take a trip to Reading Railroad",
    "Take a walk on the Boardwalk",
    "You have been elected Chairman of the Board - Pay each player $50",
    "Your building loan matures - Collect $150",
    "You have won a crossword competition - Collect $100",
];

/// Community Chest deck texts.
pub const COMMUNITY_CHEST_CARDS: [&str; 17] = [
    "Advance to Go (Collect $200)",
    "Bank error in your favor - Collect $200",
    "Doctor's fees - Pay $50",
    "From sale of stock you get $50",
    "Get Out of Jail Free",
    "Go to Jail. Go directly to Jail.",
    "Grand Opera Night - Collect $50 from every player",
    "Holiday Fund matures - Receive $100",
    "Income tax refund - Collect $20",
    "It is your birthday - Collect $10 from every player",
    "Life insurance matures - Collect $100",
    "Pay hospital fees of $100",
    "Pay school fees of $150",
    "Receive $25 consultancy fee",
    "You are assessed for street repairs - $40 per house, $115 per hotel",
    "You have won second prize in a beauty contest - Collect $10",
    "You inherit $100",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decks_are_populated() {
        assert_eq!(CHANCE_CARDS.len(), 16);
        assert_eq!(COMMUNITY_CHEST_CARDS.len(), 17);
        assert!(CHANCE_CARDS.iter().all(|c| !c.is_empty()));
        assert!(COMMUNITY_CHEST_CARDS.iter().all(|c| !c.is_empty()));
    }
}
