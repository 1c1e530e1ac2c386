//! The immutable board catalog.
//!
//! `BoardCatalog` bundles the square layout, the property definitions in
//! canonical (ascending-square) order, the color-group membership tables,
//! and the scalar rules. It is constructed once and passed by reference
//! into the engine and encoder.

use serde::{Deserialize, Serialize};

use super::cards::{CHANCE_CARDS, COMMUNITY_CHEST_CARDS};
use super::definition::{ColorGroup, PropertyDef, RentSchedule, SquareId, SquareKind};

/// Scalar game rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardRules {
    /// Cash each player starts with.
    pub starting_cash: i64,

    /// Salary credited when wrapping past Go.
    pub go_salary: i64,

    /// Flat deduction on the income tax square.
    pub income_tax: i64,

    /// Flat deduction on the luxury tax square.
    pub luxury_tax: i64,

    /// Cost of bailing out of jail.
    pub jail_bail: i64,

    /// Jailed turns after which bail is forced.
    pub max_jail_turns: u8,

    /// Houses per property before the hotel upgrade.
    pub max_houses: u8,

    /// Cash tiers for trade offers, as fractions of the property price.
    pub trade_cash_tiers: Vec<f64>,

    /// Interest charged on top of the mortgage value when unmortgaging.
    pub unmortgage_interest: f64,
}

impl Default for BoardRules {
    fn default() -> Self {
        Self {
            starting_cash: 1500,
            go_salary: 200,
            income_tax: 200,
            luxury_tax: 100,
            jail_bail: 50,
            max_jail_turns: 3,
            max_houses: 4,
            trade_cash_tiers: vec![0.75, 1.0, 1.25],
            unmortgage_interest: 0.10,
        }
    }
}

impl BoardRules {
    /// Cost of lifting a mortgage: the mortgage value plus interest.
    #[must_use]
    pub fn unmortgage_cost(&self, mortgage: i64) -> i64 {
        (mortgage as f64 * (1.0 + self.unmortgage_interest)) as i64
    }

    /// The cheapest trade cash tier (used as the affordability gate when
    /// enumerating buy offers).
    #[must_use]
    pub fn cheapest_tier(&self) -> f64 {
        self.trade_cash_tiers
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }
}

/// The immutable board catalog.
///
/// Properties are stored in canonical order (ascending square id); the
/// `ordinal` used throughout the crate is an index into that order.
#[derive(Clone, Debug)]
pub struct BoardCatalog {
    squares: Vec<SquareKind>,
    properties: Vec<PropertyDef>,
    property_by_square: Vec<Option<usize>>,
    streets: Vec<usize>,
    groups: Vec<(ColorGroup, Vec<usize>)>,
    jail: SquareId,
    rules: BoardRules,
}

impl BoardCatalog {
    /// Assemble a catalog from a square layout, property definitions, and
    /// rules. Property definitions are sorted into canonical order; the
    /// group and street index tables are derived.
    ///
    /// Panics if a property sits on a square not marked
    /// `SquareKind::Property`, or if the layout has no jail square.
    #[must_use]
    pub fn new(squares: Vec<SquareKind>, mut properties: Vec<PropertyDef>, rules: BoardRules) -> Self {
        properties.sort_by_key(|p| p.square);

        let mut property_by_square = vec![None; squares.len()];
        for (ordinal, def) in properties.iter().enumerate() {
            assert_eq!(
                squares[def.square.index()],
                SquareKind::Property,
                "property {} not on a property square",
                def.name
            );
            property_by_square[def.square.index()] = Some(ordinal);
        }

        let streets = properties
            .iter()
            .enumerate()
            .filter(|(_, def)| def.is_street())
            .map(|(ordinal, _)| ordinal)
            .collect();

        let mut groups: Vec<(ColorGroup, Vec<usize>)> = Vec::new();
        for group in ColorGroup::ALL {
            let members: Vec<usize> = properties
                .iter()
                .enumerate()
                .filter(|(_, def)| def.group == group)
                .map(|(ordinal, _)| ordinal)
                .collect();
            if !members.is_empty() {
                groups.push((group, members));
            }
        }

        let jail = squares
            .iter()
            .position(|&k| k == SquareKind::Jail)
            .map(|i| SquareId::new(i as u8));
        let jail = match jail {
            Some(sq) => sq,
            None => panic!("board layout has no jail square"),
        };

        Self {
            squares,
            properties,
            property_by_square,
            streets,
            groups,
            jail,
            rules,
        }
    }

    /// The classic US board: 40 squares, 28 properties, default rules.
    #[must_use]
    pub fn us_standard() -> Self {
        use SquareKind::*;

        let squares = vec![
            Go,             // 0
            Property,       // 1  Mediterranean Avenue
            CommunityChest, // 2
            Property,       // 3  Baltic Avenue
            IncomeTax,      // 4
            Property,       // 5  Reading Railroad
            Property,       // 6  Oriental Avenue
            Chance,         // 7
            Property,       // 8  Vermont Avenue
            Property,       // 9  Connecticut Avenue
            Jail,           // 10
            Property,       // 11 St. Charles Place
            Property,       // 12 Electric Company
            Property,       // 13 States Avenue
            Property,       // 14 Virginia Avenue
            Property,       // 15 Pennsylvania Railroad
            Property,       // 16 St. James Place
            CommunityChest, // 17
            Property,       // 18 Tennessee Avenue
            Property,       // 19 New York Avenue
            FreeParking,    // 20
            Property,       // 21 Kentucky Avenue
            Chance,         // 22
            Property,       // 23 Indiana Avenue
            Property,       // 24 Illinois Avenue
            Property,       // 25 B&O Railroad
            Property,       // 26 Atlantic Avenue
            Property,       // 27 Ventnor Avenue
            Property,       // 28 Water Works
            Property,       // 29 Marvin Gardens
            GoToJail,       // 30
            Property,       // 31 Pacific Avenue
            Property,       // 32 North Carolina Avenue
            CommunityChest, // 33
            Property,       // 34 Pennsylvania Avenue
            Property,       // 35 Short Line Railroad
            Chance,         // 36
            Property,       // 37 Park Place
            LuxuryTax,      // 38
            Property,       // 39 Boardwalk
        ];

        let properties = vec![
            street(1, "Mediterranean Avenue", 60, 30, ColorGroup::Brown, 50, [2, 10, 30, 90, 160, 250]),
            street(3, "Baltic Avenue", 60, 30, ColorGroup::Brown, 50, [4, 20, 60, 180, 320, 450]),
            railroad(5, "Reading Railroad"),
            street(6, "Oriental Avenue", 100, 50, ColorGroup::LightBlue, 50, [6, 30, 90, 270, 400, 550]),
            street(8, "Vermont Avenue", 100, 50, ColorGroup::LightBlue, 50, [6, 30, 90, 270, 400, 550]),
            street(9, "Connecticut Avenue", 120, 60, ColorGroup::LightBlue, 50, [8, 40, 100, 300, 450, 600]),
            street(11, "St. Charles Place", 140, 70, ColorGroup::Pink, 100, [10, 50, 150, 450, 625, 750]),
            utility(12, "Electric Company"),
            street(13, "States Avenue", 140, 70, ColorGroup::Pink, 100, [10, 50, 150, 450, 625, 750]),
            street(14, "Virginia Avenue", 160, 80, ColorGroup::Pink, 100, [12, 60, 180, 500, 700, 900]),
            railroad(15, "Pennsylvania Railroad"),
            street(16, "St. James Place", 180, 90, ColorGroup::Orange, 100, [14, 70, 200, 550, 750, 950]),
            street(18, "Tennessee Avenue", 180, 90, ColorGroup::Orange, 100, [14, 70, 200, 550, 750, 950]),
            street(19, "New York Avenue", 200, 100, ColorGroup::Orange, 100, [16, 80, 220, 600, 800, 1000]),
            street(21, "Kentucky Avenue", 220, 110, ColorGroup::Red, 150, [18, 90, 250, 700, 875, 1050]),
            street(23, "Indiana Avenue", 220, 110, ColorGroup::Red, 150, [18, 90, 250, 700, 875, 1050]),
            street(24, "Illinois Avenue", 240, 120, ColorGroup::Red, 150, [20, 100, 300, 750, 925, 1100]),
            railroad(25, "B&O Railroad"),
            street(26, "Atlantic Avenue", 260, 130, ColorGroup::Yellow, 150, [22, 110, 330, 800, 975, 1150]),
            street(27, "Ventnor Avenue", 260, 130, ColorGroup::Yellow, 150, [22, 110, 330, 800, 975, 1150]),
            utility(28, "Water Works"),
            street(29, "Marvin Gardens", 280, 140, ColorGroup::Yellow, 150, [24, 120, 360, 850, 1025, 1200]),
            street(31, "Pacific Avenue", 300, 150, ColorGroup::Green, 200, [26, 130, 390, 900, 1100, 1275]),
            street(32, "North Carolina Avenue", 300, 150, ColorGroup::Green, 200, [26, 130, 390, 900, 1100, 1275]),
            street(34, "Pennsylvania Avenue", 320, 160, ColorGroup::Green, 200, [28, 150, 450, 1000, 1200, 1400]),
            railroad(35, "Short Line Railroad"),
            street(37, "Park Place", 350, 175, ColorGroup::DarkBlue, 200, [35, 175, 500, 1100, 1300, 1500]),
            street(39, "Boardwalk", 400, 200, ColorGroup::DarkBlue, 200, [50, 200, 600, 1400, 1700, 2000]),
        ];

        Self::new(squares, properties, BoardRules::default())
    }

    /// Number of board squares.
    #[must_use]
    pub fn square_count(&self) -> usize {
        self.squares.len()
    }

    /// What kind of square sits at `square`.
    #[must_use]
    pub fn square_kind(&self, square: SquareId) -> SquareKind {
        self.squares[square.index()]
    }

    /// The jail square.
    #[must_use]
    pub fn jail_square(&self) -> SquareId {
        self.jail
    }

    /// Number of purchasable properties.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Number of improvable streets.
    #[must_use]
    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    /// Definition of the property with the given canonical ordinal.
    #[must_use]
    pub fn property(&self, ordinal: usize) -> &PropertyDef {
        &self.properties[ordinal]
    }

    /// All property definitions in canonical order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    /// Canonical ordinal of the property on `square`, if any.
    #[must_use]
    pub fn property_at(&self, square: SquareId) -> Option<usize> {
        self.property_by_square[square.index()]
    }

    /// Property ordinal of the street with the given street ordinal
    /// (index into the improvable-street list).
    #[must_use]
    pub fn street(&self, street_ordinal: usize) -> usize {
        self.streets[street_ordinal]
    }

    /// Street ordinal of a property ordinal, if it is a street.
    #[must_use]
    pub fn street_ordinal(&self, ordinal: usize) -> Option<usize> {
        self.streets.iter().position(|&p| p == ordinal)
    }

    /// Property ordinals of all improvable streets, canonical order.
    #[must_use]
    pub fn streets(&self) -> &[usize] {
        &self.streets
    }

    /// Property ordinals belonging to `group` (empty if the board has no
    /// such group).
    #[must_use]
    pub fn group_members(&self, group: ColorGroup) -> &[usize] {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, members)| members.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over every populated color group and its members.
    pub fn groups(&self) -> impl Iterator<Item = (ColorGroup, &[usize])> {
        self.groups.iter().map(|(g, members)| (*g, members.as_slice()))
    }

    /// Scalar rules.
    #[must_use]
    pub fn rules(&self) -> &BoardRules {
        &self.rules
    }

    /// Chance deck texts (decorative data).
    #[must_use]
    pub fn chance_cards(&self) -> &'static [&'static str] {
        &CHANCE_CARDS
    }

    /// Community Chest deck texts (decorative data).
    #[must_use]
    pub fn community_chest_cards(&self) -> &'static [&'static str] {
        &COMMUNITY_CHEST_CARDS
    }
}

fn street(
    square: u8,
    name: &str,
    price: i64,
    mortgage: i64,
    group: ColorGroup,
    house_price: i64,
    rent: [i64; 6],
) -> PropertyDef {
    PropertyDef {
        square: SquareId::new(square),
        name: name.into(),
        price,
        mortgage,
        group,
        house_price: Some(house_price),
        rent: RentSchedule::Street(rent),
    }
}

fn railroad(square: u8, name: &str) -> PropertyDef {
    PropertyDef {
        square: SquareId::new(square),
        name: name.into(),
        price: 200,
        mortgage: 100,
        group: ColorGroup::Railroad,
        house_price: None,
        rent: RentSchedule::Railroad([25, 50, 100, 200]),
    }
}

fn utility(square: u8, name: &str) -> PropertyDef {
    PropertyDef {
        square: SquareId::new(square),
        name: name.into(),
        price: 150,
        mortgage: 75,
        group: ColorGroup::Utility,
        house_price: None,
        rent: RentSchedule::Utility([4, 10]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_standard_shape() {
        let catalog = BoardCatalog::us_standard();
        assert_eq!(catalog.square_count(), 40);
        assert_eq!(catalog.property_count(), 28);
        assert_eq!(catalog.street_count(), 22);
        assert_eq!(catalog.jail_square(), SquareId::new(10));
    }

    #[test]
    fn test_canonical_order_is_ascending() {
        let catalog = BoardCatalog::us_standard();
        let squares: Vec<_> = catalog.properties().iter().map(|p| p.square).collect();
        let mut sorted = squares.clone();
        sorted.sort();
        assert_eq!(squares, sorted);
    }

    #[test]
    fn test_property_square_index_round_trip() {
        let catalog = BoardCatalog::us_standard();
        for ordinal in 0..catalog.property_count() {
            let square = catalog.property(ordinal).square;
            assert_eq!(catalog.property_at(square), Some(ordinal));
        }
        assert_eq!(catalog.property_at(SquareId::new(0)), None);
        assert_eq!(catalog.property_at(SquareId::new(10)), None);
    }

    #[test]
    fn test_group_sizes() {
        let catalog = BoardCatalog::us_standard();
        assert_eq!(catalog.group_members(ColorGroup::Brown).len(), 2);
        assert_eq!(catalog.group_members(ColorGroup::LightBlue).len(), 3);
        assert_eq!(catalog.group_members(ColorGroup::Pink).len(), 3);
        assert_eq!(catalog.group_members(ColorGroup::Orange).len(), 3);
        assert_eq!(catalog.group_members(ColorGroup::Red).len(), 3);
        assert_eq!(catalog.group_members(ColorGroup::Yellow).len(), 3);
        assert_eq!(catalog.group_members(ColorGroup::Green).len(), 3);
        assert_eq!(catalog.group_members(ColorGroup::DarkBlue).len(), 2);
        assert_eq!(catalog.group_members(ColorGroup::Railroad).len(), 4);
        assert_eq!(catalog.group_members(ColorGroup::Utility).len(), 2);
    }

    #[test]
    fn test_streets_exclude_railroads_and_utilities() {
        let catalog = BoardCatalog::us_standard();
        for &ordinal in catalog.streets() {
            assert!(catalog.property(ordinal).is_street());
        }
        let street_squares: Vec<u8> = catalog
            .streets()
            .iter()
            .map(|&o| catalog.property(o).square.0)
            .collect();
        assert!(!street_squares.contains(&5));
        assert!(!street_squares.contains(&12));
    }

    #[test]
    fn test_street_ordinal_round_trip() {
        let catalog = BoardCatalog::us_standard();
        for street_ordinal in 0..catalog.street_count() {
            let ordinal = catalog.street(street_ordinal);
            assert_eq!(catalog.street_ordinal(ordinal), Some(street_ordinal));
        }
    }

    #[test]
    fn test_card_decks_are_exposed() {
        let catalog = BoardCatalog::us_standard();
        assert!(!catalog.chance_cards().is_empty());
        assert!(!catalog.community_chest_cards().is_empty());
    }

    #[test]
    fn test_rules_defaults() {
        let rules = BoardRules::default();
        assert_eq!(rules.starting_cash, 1500);
        assert_eq!(rules.go_salary, 200);
        assert_eq!(rules.unmortgage_cost(100), 110);
        assert!((rules.cheapest_tier() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "no jail square")]
    fn test_layout_without_jail_panics() {
        BoardCatalog::new(vec![SquareKind::Go], Vec::new(), BoardRules::default());
    }
}
