//! Bijective mapping between structured actions and dense indices.

use thiserror::Error;

use crate::board::BoardCatalog;

use super::action::Action;

/// Number of parameter-free actions at the front of the index space.
pub const BINARY_ACTIONS: usize = 9;

/// Decoding failure: the index lies outside the declared action space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("action index {index} out of range for action space of size {size}")]
pub struct DecodeError {
    /// The offending index.
    pub index: usize,
    /// Total action-space size.
    pub size: usize,
}

/// Bijective action codec.
///
/// Sections are laid out in a fixed offset order: binary actions,
/// per-property mortgage and unmortgage, per-street build-house,
/// build-hotel, sell-house and sell-hotel, per-property sell-to-bank,
/// then the three trade-offer families. The total size is derived from
/// the section sizes, which in turn derive from the player, property,
/// street, and cash-tier counts.
#[derive(Clone, Debug)]
pub struct ActionCodec {
    properties: usize,
    streets: usize,
    tiers: usize,
    counterparts: usize,
    mortgage: usize,
    unmortgage: usize,
    build_house: usize,
    build_hotel: usize,
    sell_house: usize,
    sell_hotel: usize,
    sell_to_bank: usize,
    offer_buy: usize,
    offer_sell: usize,
    offer_exchange: usize,
    size: usize,
}

impl ActionCodec {
    /// Build a codec for the given dimensions.
    ///
    /// Panics on degenerate dimensions (fewer than two players or
    /// properties, more streets than properties, zero tiers).
    #[must_use]
    pub fn new(players: usize, properties: usize, streets: usize, tiers: usize) -> Self {
        assert!(players >= 2, "need at least two players to trade");
        assert!(properties >= 2, "need at least two properties to exchange");
        assert!(streets <= properties, "streets are a subset of properties");
        assert!(tiers >= 1, "need at least one trade cash tier");

        let counterparts = players - 1;
        let mortgage = BINARY_ACTIONS;
        let unmortgage = mortgage + properties;
        let build_house = unmortgage + properties;
        let build_hotel = build_house + streets;
        let sell_house = build_hotel + streets;
        let sell_hotel = sell_house + streets;
        let sell_to_bank = sell_hotel + streets;
        let offer_buy = sell_to_bank + properties;
        let offer_sell = offer_buy + counterparts * properties * tiers;
        let offer_exchange = offer_sell + counterparts * properties * tiers;
        let size = offer_exchange + counterparts * properties * (properties - 1);

        Self {
            properties,
            streets,
            tiers,
            counterparts,
            mortgage,
            unmortgage,
            build_house,
            build_hotel,
            sell_house,
            sell_hotel,
            sell_to_bank,
            offer_buy,
            offer_sell,
            offer_exchange,
            size,
        }
    }

    /// Build a codec sized from a board catalog and a player count.
    #[must_use]
    pub fn from_catalog(catalog: &BoardCatalog, players: usize) -> Self {
        Self::new(
            players,
            catalog.property_count(),
            catalog.street_count(),
            catalog.rules().trade_cash_tiers.len(),
        )
    }

    /// Total number of action indices.
    #[must_use]
    pub fn space_size(&self) -> usize {
        self.size
    }

    /// Encode a structured action into its dense index.
    ///
    /// Panics if a parameter lies outside the codec's dimensions or if an
    /// exchange offers and requests the same property; such values are
    /// outside the declared domain.
    #[must_use]
    pub fn encode(&self, action: Action) -> usize {
        if let Some(ordinal) = action.binary_ordinal() {
            return ordinal;
        }
        match action {
            Action::Mortgage { property } => self.mortgage + self.check_property(property),
            Action::Unmortgage { property } => self.unmortgage + self.check_property(property),
            Action::BuildHouse { street } => self.build_house + self.check_street(street),
            Action::BuildHotel { street } => self.build_hotel + self.check_street(street),
            Action::SellHouse { street } => self.sell_house + self.check_street(street),
            Action::SellHotel { street } => self.sell_hotel + self.check_street(street),
            Action::SellToBank { property } => self.sell_to_bank + self.check_property(property),
            Action::OfferBuy {
                counterpart,
                property,
                tier,
            } => self.offer_buy + self.cash_offer_index(counterpart, property, tier),
            Action::OfferSell {
                counterpart,
                property,
                tier,
            } => self.offer_sell + self.cash_offer_index(counterpart, property, tier),
            Action::OfferExchange {
                counterpart,
                offered,
                requested,
            } => {
                self.check_counterpart(counterpart);
                self.check_property(offered);
                self.check_property(requested);
                assert_ne!(offered, requested, "exchange must name two distinct properties");
                // The requested index space skips the offered property's
                // own slot, so anything above it shifts down by one.
                let requested_raw = if requested > offered {
                    requested - 1
                } else {
                    requested
                };
                self.offer_exchange
                    + counterpart * self.properties * (self.properties - 1)
                    + offered * (self.properties - 1)
                    + requested_raw
            }
            _ => unreachable!("binary actions handled above"),
        }
    }

    /// Decode a dense index back into its structured action.
    pub fn decode(&self, index: usize) -> Result<Action, DecodeError> {
        if index >= self.size {
            return Err(DecodeError {
                index,
                size: self.size,
            });
        }
        if index < self.mortgage {
            let action = match index {
                0 => Action::DoNothing,
                1 => Action::EndTurn,
                2 => Action::RollDice,
                3 => Action::BuyProperty,
                4 => Action::UseJailCard,
                5 => Action::PayBail,
                6 => Action::DeclareBankrupt,
                7 => Action::AcceptTrade,
                _ => Action::DeclineTrade,
            };
            return Ok(action);
        }
        if index < self.unmortgage {
            return Ok(Action::Mortgage {
                property: index - self.mortgage,
            });
        }
        if index < self.build_house {
            return Ok(Action::Unmortgage {
                property: index - self.unmortgage,
            });
        }
        if index < self.build_hotel {
            return Ok(Action::BuildHouse {
                street: index - self.build_house,
            });
        }
        if index < self.sell_house {
            return Ok(Action::BuildHotel {
                street: index - self.build_hotel,
            });
        }
        if index < self.sell_hotel {
            return Ok(Action::SellHouse {
                street: index - self.sell_house,
            });
        }
        if index < self.sell_to_bank {
            return Ok(Action::SellHotel {
                street: index - self.sell_hotel,
            });
        }
        if index < self.offer_buy {
            return Ok(Action::SellToBank {
                property: index - self.sell_to_bank,
            });
        }
        if index < self.offer_sell {
            let (counterpart, property, tier) = self.split_cash_offer(index - self.offer_buy);
            return Ok(Action::OfferBuy {
                counterpart,
                property,
                tier,
            });
        }
        if index < self.offer_exchange {
            let (counterpart, property, tier) = self.split_cash_offer(index - self.offer_sell);
            return Ok(Action::OfferSell {
                counterpart,
                property,
                tier,
            });
        }

        let local = index - self.offer_exchange;
        let per_counterpart = self.properties * (self.properties - 1);
        let counterpart = local / per_counterpart;
        let rem = local % per_counterpart;
        let offered = rem / (self.properties - 1);
        let requested_raw = rem % (self.properties - 1);
        let requested = if requested_raw < offered {
            requested_raw
        } else {
            requested_raw + 1
        };
        Ok(Action::OfferExchange {
            counterpart,
            offered,
            requested,
        })
    }

    /// Render a human-readable description of an action index.
    pub fn describe(&self, index: usize, catalog: &BoardCatalog) -> Result<String, DecodeError> {
        let name = |ordinal: usize| catalog.property(ordinal).name.clone();
        let street_name = |street: usize| catalog.property(catalog.street(street)).name.clone();
        let text = match self.decode(index)? {
            Action::DoNothing => "do nothing".into(),
            Action::EndTurn => "end turn".into(),
            Action::RollDice => "roll dice".into(),
            Action::BuyProperty => "buy landed-on property".into(),
            Action::UseJailCard => "use get-out-of-jail-free card".into(),
            Action::PayBail => "pay bail".into(),
            Action::DeclareBankrupt => "declare bankruptcy".into(),
            Action::AcceptTrade => "accept trade".into(),
            Action::DeclineTrade => "decline trade".into(),
            Action::Mortgage { property } => format!("mortgage {}", name(property)),
            Action::Unmortgage { property } => format!("unmortgage {}", name(property)),
            Action::BuildHouse { street } => format!("build house on {}", street_name(street)),
            Action::BuildHotel { street } => format!("build hotel on {}", street_name(street)),
            Action::SellHouse { street } => format!("sell house on {}", street_name(street)),
            Action::SellHotel { street } => format!("sell hotel on {}", street_name(street)),
            Action::SellToBank { property } => format!("sell {} to the bank", name(property)),
            Action::OfferBuy {
                counterpart,
                property,
                tier,
            } => format!(
                "offer counterpart {} {:.2}x price for {}",
                counterpart, catalog.rules().trade_cash_tiers[tier], name(property)
            ),
            Action::OfferSell {
                counterpart,
                property,
                tier,
            } => format!(
                "offer {} to counterpart {} at {:.2}x price",
                name(property), counterpart, catalog.rules().trade_cash_tiers[tier]
            ),
            Action::OfferExchange {
                counterpart,
                offered,
                requested,
            } => format!(
                "offer counterpart {} {} for {}",
                counterpart, name(offered), name(requested)
            ),
        };
        Ok(text)
    }

    fn cash_offer_index(&self, counterpart: usize, property: usize, tier: usize) -> usize {
        self.check_counterpart(counterpart);
        self.check_property(property);
        assert!(tier < self.tiers, "cash tier {tier} out of range");
        counterpart * self.properties * self.tiers + property * self.tiers + tier
    }

    fn split_cash_offer(&self, local: usize) -> (usize, usize, usize) {
        let per_counterpart = self.properties * self.tiers;
        let counterpart = local / per_counterpart;
        let rem = local % per_counterpart;
        (counterpart, rem / self.tiers, rem % self.tiers)
    }

    fn check_property(&self, property: usize) -> usize {
        assert!(
            property < self.properties,
            "property ordinal {property} out of range"
        );
        property
    }

    fn check_street(&self, street: usize) -> usize {
        assert!(street < self.streets, "street ordinal {street} out of range");
        street
    }

    fn check_counterpart(&self, counterpart: usize) {
        assert!(
            counterpart < self.counterparts,
            "counterpart slot {counterpart} out of range"
        );
    }
}
