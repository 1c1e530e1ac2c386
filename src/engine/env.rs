//! The Monopoly environment.

use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::actions::{Action, ActionCodec};
use crate::board::{BoardCatalog, SquareId, SquareKind};
use crate::core::{GameRng, Player, PlayerId, PropertyState, TradeOffer, HOTEL_LEVEL};
use crate::encoder::{Observation, ObservationEncoder};
use crate::NUM_PLAYERS;

use super::error::EngineError;
use super::types::{Phase, StepInfo, StepOutcome};

/// Builder for a [`MonopolyEnv`].
pub struct MonopolyEnvBuilder {
    catalog: Option<BoardCatalog>,
    max_rounds: u32,
    agent: PlayerId,
}

impl Default for MonopolyEnvBuilder {
    fn default() -> Self {
        Self {
            catalog: None,
            max_rounds: 200,
            agent: PlayerId::new(0),
        }
    }
}

impl MonopolyEnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom board catalog instead of the classic US board.
    #[must_use]
    pub fn catalog(mut self, catalog: BoardCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Round limit after which the game ends on net worth.
    #[must_use]
    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// The player whose perspective rewards and observations use.
    #[must_use]
    pub fn agent(mut self, agent: PlayerId) -> Self {
        self.agent = agent;
        self
    }

    /// Build the environment and run the initial reset.
    pub fn build(self, seed: u64) -> MonopolyEnv {
        assert!(
            self.agent.index() < NUM_PLAYERS,
            "agent id out of range"
        );
        let catalog = self.catalog.unwrap_or_else(BoardCatalog::us_standard);
        let codec = ActionCodec::from_catalog(&catalog, NUM_PLAYERS);
        let mut env = MonopolyEnv {
            codec,
            encoder: ObservationEncoder::new(),
            rng: GameRng::new(seed),
            players: Vec::new(),
            properties: Vec::new(),
            turn_order: Vec::new(),
            turn_index: 0,
            round: 0,
            max_rounds: self.max_rounds,
            done: false,
            pending_trades: FxHashMap::default(),
            last_dice: (1, 1),
            phase: Phase::PreRoll,
            has_rolled: false,
            waiting: SmallVec::new(),
            agent: self.agent,
            catalog,
        };
        env.reset();
        env
    }
}

/// Full 4-player Monopoly environment.
///
/// One external driver applies one action per [`step`](Self::step) call;
/// every call runs to completion and no partial-application state is
/// observable. Consumers should fetch [`legal_actions`](Self::legal_actions)
/// before choosing: a structurally valid index outside the legal set
/// leaves the state unmutated.
pub struct MonopolyEnv {
    catalog: BoardCatalog,
    codec: ActionCodec,
    encoder: ObservationEncoder,
    rng: GameRng,
    players: Vec<Player>,
    properties: Vec<PropertyState>,
    turn_order: Vec<PlayerId>,
    turn_index: usize,
    round: u32,
    max_rounds: u32,
    done: bool,
    pending_trades: FxHashMap<PlayerId, TradeOffer>,
    last_dice: (u8, u8),
    phase: Phase,
    has_rolled: bool,
    waiting: SmallVec<[PlayerId; NUM_PLAYERS]>,
    agent: PlayerId,
}

impl MonopolyEnv {
    /// Build a default environment (classic board, 200 rounds, agent 0).
    #[must_use]
    pub fn new(seed: u64) -> Self {
        MonopolyEnvBuilder::new().build(seed)
    }

    // === Core contract ===

    /// Reinitialize every player and property, reshuffle the turn order,
    /// and return the initial observation for the designated player.
    pub fn reset(&mut self) -> Observation {
        let starting_cash = self.catalog.rules().starting_cash;
        self.players = PlayerId::all(NUM_PLAYERS)
            .map(|id| Player::new(id, starting_cash))
            .collect();
        self.properties = vec![PropertyState::default(); self.catalog.property_count()];
        self.turn_order = PlayerId::all(NUM_PLAYERS).collect();
        self.rng.shuffle(&mut self.turn_order);
        self.turn_index = 0;
        self.round = 0;
        self.done = false;
        self.pending_trades.clear();
        self.last_dice = (1, 1);
        self.phase = Phase::PreRoll;
        self.has_rolled = false;
        self.waiting.clear();
        self.update_monopolies();
        debug!("reset; turn order {:?}", self.turn_order);
        self.observe(self.agent)
    }

    /// Apply one action for whoever [`whose_turn`](Self::whose_turn)
    /// currently names.
    ///
    /// Fails loudly on an index outside the action space or when the game
    /// is already over. An in-range index that is not legal for the
    /// current (player, phase) is absorbed as a no-op, reported through
    /// `info.applied`.
    pub fn step(&mut self, index: usize) -> Result<StepOutcome, EngineError> {
        if self.done {
            return Err(EngineError::GameFinished);
        }
        let action = self.codec.decode(index)?;
        let pid = self.whose_turn();
        let mut info = StepInfo::new(pid, self.phase);

        if self.legal_actions(Some(pid)).contains(&index) {
            info.applied = true;
            self.apply(pid, action, &mut info);
        } else {
            trace!("{pid} chose inapplicable action {index}; ignored");
        }

        let reward = self.reward(self.agent);
        self.check_game_over();
        Ok(StepOutcome {
            observation: self.observe(self.agent),
            reward,
            done: self.done,
            info,
        })
    }

    /// Action indices currently valid for `player` (or for whoever should
    /// act, if omitted). Never empty: a no-op is always available.
    pub fn legal_actions(&self, player: Option<PlayerId>) -> Vec<usize> {
        let pid = player.unwrap_or_else(|| self.whose_turn());
        let p = self.player(pid);
        if p.bankrupt {
            return vec![self.codec.encode(Action::DoNothing)];
        }
        let active = self.active_player();
        let rules = self.catalog.rules();
        let mut allowed = Vec::new();

        match self.phase {
            Phase::OutOfTurn if pid != active => {
                allowed.push(self.codec.encode(Action::EndTurn));
                if self.incoming_trade(pid).is_some() {
                    allowed.push(self.codec.encode(Action::AcceptTrade));
                    allowed.push(self.codec.encode(Action::DeclineTrade));
                }
                self.trade_offer_actions(pid, &mut allowed);
            }
            Phase::PreRoll if pid == active => {
                allowed.push(self.codec.encode(Action::EndTurn));
                if p.in_jail {
                    if p.jail_card {
                        allowed.push(self.codec.encode(Action::UseJailCard));
                    }
                    if p.can_afford(rules.jail_bail) {
                        allowed.push(self.codec.encode(Action::PayBail));
                    }
                }
                self.mortgage_actions(pid, &mut allowed);
                self.improvement_actions(pid, &mut allowed);
                self.trade_offer_actions(pid, &mut allowed);
                if self.incoming_trade(pid).is_some() {
                    allowed.push(self.codec.encode(Action::AcceptTrade));
                    allowed.push(self.codec.encode(Action::DeclineTrade));
                }
            }
            Phase::PostRoll if pid == active => {
                if !self.has_rolled {
                    if p.in_jail {
                        if p.jail_card {
                            allowed.push(self.codec.encode(Action::UseJailCard));
                        }
                        if p.can_afford(rules.jail_bail) {
                            allowed.push(self.codec.encode(Action::PayBail));
                        }
                    }
                    allowed.push(self.codec.encode(Action::RollDice));
                } else {
                    if let Some(ordinal) = self.catalog.property_at(p.position) {
                        let st = &self.properties[ordinal];
                        if st.owner.is_none() && p.can_afford(self.catalog.property(ordinal).price)
                        {
                            allowed.push(self.codec.encode(Action::BuyProperty));
                        }
                    }
                    self.mortgage_actions(pid, &mut allowed);
                    allowed.push(self.codec.encode(Action::EndTurn));
                    if p.cash < 0 {
                        allowed.push(self.codec.encode(Action::DeclareBankrupt));
                    }
                }
            }
            _ => {}
        }

        if allowed.is_empty() {
            allowed.push(self.codec.encode(Action::DoNothing));
        }
        allowed
    }

    /// The player who should act right now.
    #[must_use]
    pub fn whose_turn(&self) -> PlayerId {
        if self.phase == Phase::OutOfTurn {
            if let Some(&first) = self.waiting.first() {
                return first;
            }
        }
        self.turn_order[self.turn_index]
    }

    /// The player whose turn proper it is (pre/post-roll owner).
    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn_order[self.turn_index]
    }

    /// The winner, once the game is over: the sole survivor, or the
    /// highest-net-worth player (bankrupts included) on a round-limit
    /// finish. `None` while the game is still running.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        if !self.done {
            return None;
        }
        let mut alive = self.players.iter().filter(|p| !p.bankrupt);
        if let (Some(sole), None) = (alive.next(), alive.next()) {
            return Some(sole.id);
        }
        self.players
            .iter()
            .max_by(|a, b| {
                self.net_worth(a.id).total_cmp(&self.net_worth(b.id))
            })
            .map(|p| p.id)
    }

    /// Encode the current state from `perspective`.
    #[must_use]
    pub fn observe(&self, perspective: PlayerId) -> Observation {
        self.encoder
            .encode(&self.catalog, &self.players, &self.properties, perspective)
    }

    // === Accessors ===

    /// The game is over.
    #[must_use]
    pub fn done(&self) -> bool {
        self.done
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed turn-order cycles.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// The most recent dice roll.
    #[must_use]
    pub fn last_dice(&self) -> (u8, u8) {
        self.last_dice
    }

    /// The board catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &BoardCatalog {
        &self.catalog
    }

    /// The action codec sized for this environment.
    #[must_use]
    pub fn codec(&self) -> &ActionCodec {
        &self.codec
    }

    /// One player's state.
    #[must_use]
    pub fn player(&self, pid: PlayerId) -> &Player {
        &self.players[pid.index()]
    }

    /// All players, by id.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// One property's state, by canonical ordinal.
    #[must_use]
    pub fn property(&self, ordinal: usize) -> &PropertyState {
        &self.properties[ordinal]
    }

    /// All property states, canonical order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyState] {
        &self.properties
    }

    /// The pending offer addressed to `pid`, scanning senders in
    /// ascending id order.
    #[must_use]
    pub fn incoming_trade(&self, pid: PlayerId) -> Option<&TradeOffer> {
        PlayerId::all(self.players.len())
            .filter_map(|sender| self.pending_trades.get(&sender))
            .find(|offer| offer.recipient == pid)
    }

    /// The pending offer opened by `pid`, if any.
    #[must_use]
    pub fn outgoing_trade(&self, pid: PlayerId) -> Option<&TradeOffer> {
        self.pending_trades.get(&pid)
    }

    /// Net worth of one player.
    #[must_use]
    pub fn net_worth(&self, pid: PlayerId) -> f64 {
        self.player(pid).net_worth(&self.catalog, &self.properties)
    }

    // === Action application ===

    fn apply(&mut self, pid: PlayerId, action: Action, info: &mut StepInfo) {
        match action {
            Action::DoNothing => {}
            Action::EndTurn => self.end_turn(pid),
            Action::RollDice => self.roll_and_move(pid, info),
            Action::BuyProperty => self.buy_landed(pid),
            Action::UseJailCard => {
                let player = self.player_mut(pid);
                player.jail_card = false;
                player.in_jail = false;
                player.jail_turns = 0;
                debug!("{pid} used a get-out-of-jail-free card");
            }
            Action::PayBail => {
                let bail = self.catalog.rules().jail_bail;
                let player = self.player_mut(pid);
                player.cash -= bail;
                player.in_jail = false;
                player.jail_turns = 0;
                debug!("{pid} paid {bail} bail");
            }
            Action::DeclareBankrupt => self.bankrupt(pid),
            Action::AcceptTrade => self.accept_trade(pid),
            Action::DeclineTrade => self.decline_trade(pid),
            Action::Mortgage { property } => {
                let value = self.catalog.property(property).mortgage;
                self.properties[property].mortgaged = true;
                self.player_mut(pid).cash += value;
            }
            Action::Unmortgage { property } => {
                let cost = self
                    .catalog
                    .rules()
                    .unmortgage_cost(self.catalog.property(property).mortgage);
                self.properties[property].mortgaged = false;
                self.player_mut(pid).cash -= cost;
            }
            Action::BuildHouse { street } => {
                let ordinal = self.catalog.street(street);
                let price = self.house_price(ordinal);
                self.properties[ordinal].houses += 1;
                self.player_mut(pid).cash -= price;
            }
            Action::BuildHotel { street } => {
                let ordinal = self.catalog.street(street);
                let price = self.house_price(ordinal);
                self.properties[ordinal].houses = HOTEL_LEVEL;
                self.player_mut(pid).cash -= price;
            }
            Action::SellHouse { street } => {
                let ordinal = self.catalog.street(street);
                let price = self.house_price(ordinal);
                self.properties[ordinal].houses -= 1;
                self.player_mut(pid).cash += price / 2;
            }
            Action::SellHotel { street } => {
                let ordinal = self.catalog.street(street);
                let price = self.house_price(ordinal);
                self.properties[ordinal].houses = self.catalog.rules().max_houses;
                self.player_mut(pid).cash += price / 2;
            }
            Action::SellToBank { property } => {
                let value = self.catalog.property(property).mortgage;
                self.properties[property].owner = None;
                self.properties[property].mortgaged = false;
                let player = self.player_mut(pid);
                player.release(property);
                player.cash += value;
                self.update_monopolies();
            }
            Action::OfferBuy {
                counterpart,
                property,
                tier,
            } => self.open_cash_offer(pid, counterpart, property, tier, true),
            Action::OfferSell {
                counterpart,
                property,
                tier,
            } => self.open_cash_offer(pid, counterpart, property, tier, false),
            Action::OfferExchange {
                counterpart,
                offered,
                requested,
            } => self.open_exchange_offer(pid, counterpart, offered, requested),
        }
    }

    // === Turn and phase advancement ===

    fn end_turn(&mut self, pid: PlayerId) {
        let active = self.active_player();
        match self.phase {
            Phase::PreRoll if pid == active => {
                self.phase = Phase::PostRoll;
                self.has_rolled = false;
            }
            Phase::PostRoll if pid == active => {
                self.phase = Phase::OutOfTurn;
                let waiting: SmallVec<[PlayerId; NUM_PLAYERS]> = self
                    .turn_order
                    .iter()
                    .copied()
                    .filter(|&p| p != active && !self.player(p).bankrupt)
                    .collect();
                self.waiting = waiting;
                if self.waiting.is_empty() {
                    self.next_player();
                }
            }
            Phase::OutOfTurn => {
                if let Some(pos) = self.waiting.iter().position(|&p| p == pid) {
                    self.waiting.remove(pos);
                }
                if self.waiting.is_empty() {
                    self.next_player();
                }
            }
            _ => {}
        }
    }

    /// Advance to the next non-bankrupt player's pre-roll phase, bumping
    /// the round counter on a turn-order wrap and clearing pending trades.
    fn next_player(&mut self) {
        let n = self.turn_order.len();
        let mut next = (self.turn_index + 1) % n;
        let mut skipped = 0;
        while skipped < n && self.player(self.turn_order[next]).bankrupt {
            next = (next + 1) % n;
            skipped += 1;
        }
        if next <= self.turn_index {
            self.round += 1;
        }
        self.turn_index = next;
        self.phase = Phase::PreRoll;
        self.has_rolled = false;
        self.waiting.clear();
        self.pending_trades.clear();
        trace!("turn passes to {} (round {})", self.turn_order[next], self.round);
    }

    // === Dice and landing ===

    fn roll_and_move(&mut self, pid: PlayerId, info: &mut StepInfo) {
        let d1 = self.rng.roll_die();
        let d2 = self.rng.roll_die();
        self.advance_and_resolve(pid, d1, d2, info);
    }

    fn advance_and_resolve(&mut self, pid: PlayerId, d1: u8, d2: u8, info: &mut StepInfo) {
        self.last_dice = (d1, d2);
        info.dice = Some((d1, d2));
        self.has_rolled = true;
        debug!("{pid} rolled {d1}+{d2}");

        let bail = self.catalog.rules().jail_bail;
        let max_jail_turns = self.catalog.rules().max_jail_turns;
        let salary = self.catalog.rules().go_salary;
        let square_count = self.catalog.square_count();

        {
            let player = self.player_mut(pid);
            if player.in_jail {
                player.jail_turns += 1;
                if d1 == d2 {
                    player.in_jail = false;
                    player.jail_turns = 0;
                    debug!("{pid} rolled doubles and leaves jail");
                } else if player.jail_turns >= max_jail_turns {
                    let paid = bail.min(player.cash).max(0);
                    player.cash -= paid;
                    player.in_jail = false;
                    player.jail_turns = 0;
                    debug!("{pid} paid {paid} forced bail");
                } else {
                    // Held in jail; the turn ends without moving.
                    return;
                }
            }

            let from = player.position.index();
            let landed = (from + usize::from(d1 + d2)) % square_count;
            if landed < from {
                player.cash += salary;
                debug!("{pid} passed Go");
            }
            player.position = SquareId::new(landed as u8);
        }

        self.resolve_landing(pid, d1 + d2, info);
    }

    fn resolve_landing(&mut self, pid: PlayerId, dice_total: u8, info: &mut StepInfo) {
        let square = self.player(pid).position;
        info.landed_on = Some(square);

        match self.catalog.square_kind(square) {
            SquareKind::GoToJail => {
                let jail = self.catalog.jail_square();
                let player = self.player_mut(pid);
                player.position = jail;
                player.in_jail = true;
                player.jail_turns = 0;
                debug!("{pid} was sent to jail");
            }
            SquareKind::IncomeTax => {
                let tax = self.catalog.rules().income_tax;
                self.charge_tax(pid, tax);
            }
            SquareKind::LuxuryTax => {
                let tax = self.catalog.rules().luxury_tax;
                self.charge_tax(pid, tax);
            }
            SquareKind::Property => {
                if let Some(ordinal) = self.catalog.property_at(square) {
                    self.resolve_property_landing(pid, ordinal, dice_total, info);
                }
            }
            // Go, jail (visiting), free parking, chance, community chest.
            _ => {}
        }
    }

    fn resolve_property_landing(
        &mut self,
        pid: PlayerId,
        ordinal: usize,
        dice_total: u8,
        info: &mut StepInfo,
    ) {
        match self.properties[ordinal].owner {
            None => {
                // The buy decision happens through a later action.
                info.can_buy = true;
            }
            Some(owner) if owner == pid => {}
            Some(owner) => {
                let rent = {
                    let railroads = self.player(owner).railroads_owned(&self.catalog);
                    let utilities = self.player(owner).utilities_owned(&self.catalog);
                    self.properties[ordinal].rent(
                        self.catalog.property(ordinal),
                        dice_total,
                        railroads,
                        utilities,
                    )
                };
                let payment = rent.min(self.player(pid).cash).max(0);
                self.player_mut(pid).cash -= payment;
                self.player_mut(owner).cash += payment;
                info.rent_paid = Some(payment);
                debug!(
                    "{pid} paid {payment} rent to {owner} for {}",
                    self.catalog.property(ordinal).name
                );
                if self.player(pid).cash <= 0 {
                    self.bankrupt(pid);
                }
            }
        }
    }

    fn charge_tax(&mut self, pid: PlayerId, amount: i64) {
        let player = self.player_mut(pid);
        let charged = amount.min(player.cash).max(0);
        player.cash -= charged;
        debug!("{pid} paid {charged} tax");
        if self.player(pid).cash <= 0 {
            self.bankrupt(pid);
        }
    }

    fn buy_landed(&mut self, pid: PlayerId) {
        let square = self.player(pid).position;
        let Some(ordinal) = self.catalog.property_at(square) else {
            return;
        };
        let price = self.catalog.property(ordinal).price;
        self.properties[ordinal].owner = Some(pid);
        let player = self.player_mut(pid);
        player.cash -= price;
        player.acquire(ordinal);
        self.update_monopolies();
        debug!("{pid} bought {}", self.catalog.property(ordinal).name);
    }

    /// Eliminate a player: zero their cash, return every owned property
    /// to the bank, and recompute monopoly flags. If the acting player
    /// went bankrupt the turn passes on immediately, so `whose_turn`
    /// never names a bankrupt player.
    fn bankrupt(&mut self, pid: PlayerId) {
        debug!("{pid} is bankrupt");
        let owned = std::mem::take(&mut self.player_mut(pid).owned);
        for ordinal in owned {
            let st = &mut self.properties[ordinal];
            st.owner = None;
            st.houses = 0;
            st.mortgaged = false;
        }
        let player = self.player_mut(pid);
        player.bankrupt = true;
        player.cash = 0;
        self.update_monopolies();

        if pid == self.active_player() {
            self.next_player();
        }
    }

    // === Trades ===

    fn accept_trade(&mut self, pid: PlayerId) {
        let sender = PlayerId::all(self.players.len()).find(|s| {
            self.pending_trades
                .get(s)
                .map_or(false, |o| o.recipient == pid)
        });
        let Some(sender) = sender else {
            return;
        };
        let Some(offer) = self.pending_trades.remove(&sender) else {
            return;
        };

        // Cash legs, each capped at what the payer can actually pay.
        let outgoing = offer.cash_offered.min(self.player(sender).cash).max(0);
        self.player_mut(sender).cash -= outgoing;
        self.player_mut(pid).cash += outgoing;
        let incoming = offer.cash_requested.min(self.player(pid).cash).max(0);
        self.player_mut(pid).cash -= incoming;
        self.player_mut(sender).cash += incoming;

        // Property legs, conditional on ownership still matching and the
        // color group still being improvement-free (houses may have gone
        // up between offer and acceptance).
        if let Some(p) = offer.offered {
            if self.properties[p].owner == Some(sender) && self.group_unimproved(p) {
                self.transfer_property(p, sender, pid);
            }
        }
        if let Some(p) = offer.requested {
            if self.properties[p].owner == Some(pid) && self.group_unimproved(p) {
                self.transfer_property(p, pid, sender);
            }
        }
        self.update_monopolies();
        debug!("{pid} accepted a trade from {sender}");
    }

    fn decline_trade(&mut self, pid: PlayerId) {
        let sender = PlayerId::all(self.players.len()).find(|s| {
            self.pending_trades
                .get(s)
                .map_or(false, |o| o.recipient == pid)
        });
        if let Some(sender) = sender {
            self.pending_trades.remove(&sender);
            debug!("{pid} declined a trade from {sender}");
        }
    }

    fn open_cash_offer(
        &mut self,
        pid: PlayerId,
        slot: usize,
        property: usize,
        tier: usize,
        buying: bool,
    ) {
        let Some(target) = self.counterpart(pid, slot) else {
            return;
        };
        let price = self.catalog.property(property).price;
        let multiplier = self.catalog.rules().trade_cash_tiers[tier];
        let cash = (price as f64 * multiplier) as i64;
        let offer = if buying {
            TradeOffer {
                sender: pid,
                recipient: target,
                offered: None,
                requested: Some(property),
                cash_offered: cash,
                cash_requested: 0,
            }
        } else {
            TradeOffer {
                sender: pid,
                recipient: target,
                offered: Some(property),
                requested: None,
                cash_offered: 0,
                cash_requested: cash,
            }
        };
        debug!(
            "{pid} offered {target} a {} trade on {}",
            if buying { "buy" } else { "sell" },
            self.catalog.property(property).name
        );
        self.pending_trades.insert(pid, offer);
    }

    fn open_exchange_offer(
        &mut self,
        pid: PlayerId,
        slot: usize,
        offered: usize,
        requested: usize,
    ) {
        let Some(target) = self.counterpart(pid, slot) else {
            return;
        };
        debug!(
            "{pid} offered {target} {} for {}",
            self.catalog.property(offered).name,
            self.catalog.property(requested).name
        );
        self.pending_trades.insert(
            pid,
            TradeOffer {
                sender: pid,
                recipient: target,
                offered: Some(offered),
                requested: Some(requested),
                cash_offered: 0,
                cash_requested: 0,
            },
        );
    }

    fn transfer_property(&mut self, ordinal: usize, from: PlayerId, to: PlayerId) {
        self.properties[ordinal].owner = Some(to);
        self.player_mut(from).release(ordinal);
        self.player_mut(to).acquire(ordinal);
    }

    // === Legal-action helpers ===

    fn mortgage_actions(&self, pid: PlayerId, out: &mut Vec<usize>) {
        let player = self.player(pid);
        for ordinal in 0..self.properties.len() {
            let st = &self.properties[ordinal];
            if st.owner != Some(pid) {
                continue;
            }
            if !st.mortgaged && st.houses == 0 {
                out.push(self.codec.encode(Action::Mortgage { property: ordinal }));
            }
            let cost = self
                .catalog
                .rules()
                .unmortgage_cost(self.catalog.property(ordinal).mortgage);
            if st.mortgaged && player.can_afford(cost) {
                out.push(self.codec.encode(Action::Unmortgage { property: ordinal }));
            }
            // Giving a property back to the bank must not strand houses
            // on a broken monopoly, so the whole group has to be bare.
            if !st.mortgaged && self.group_unimproved(ordinal) {
                out.push(self.codec.encode(Action::SellToBank { property: ordinal }));
            }
        }
    }

    fn improvement_actions(&self, pid: PlayerId, out: &mut Vec<usize>) {
        let player = self.player(pid);
        let max_houses = self.catalog.rules().max_houses;
        for street in 0..self.catalog.street_count() {
            let ordinal = self.catalog.street(street);
            let st = &self.properties[ordinal];
            if st.owner != Some(pid) {
                continue;
            }
            let price = self.house_price(ordinal);
            if st.monopoly && st.houses < max_houses && player.can_afford(price) {
                out.push(self.codec.encode(Action::BuildHouse { street }));
            }
            if st.monopoly && st.houses == max_houses && player.can_afford(price) {
                out.push(self.codec.encode(Action::BuildHotel { street }));
            }
            if st.houses >= 1 && st.houses <= max_houses {
                out.push(self.codec.encode(Action::SellHouse { street }));
            }
            if st.houses == HOTEL_LEVEL {
                out.push(self.codec.encode(Action::SellHotel { street }));
            }
        }
    }

    fn trade_offer_actions(&self, pid: PlayerId, out: &mut Vec<usize>) {
        if self.pending_trades.contains_key(&pid) {
            return;
        }
        let player = self.player(pid);
        let tiers = self.catalog.rules().trade_cash_tiers.len();
        let cheapest = self.catalog.rules().cheapest_tier();

        let others: Vec<PlayerId> = self.counterparts(pid).collect();
        for (slot, &other) in others.iter().enumerate() {
            if self.player(other).bankrupt {
                continue;
            }
            for ordinal in 0..self.properties.len() {
                if !self.group_unimproved(ordinal) {
                    continue;
                }
                let st = &self.properties[ordinal];
                let price = self.catalog.property(ordinal).price;
                if st.owner == Some(other) {
                    if player.can_afford((price as f64 * cheapest) as i64) {
                        for tier in 0..tiers {
                            out.push(self.codec.encode(Action::OfferBuy {
                                counterpart: slot,
                                property: ordinal,
                                tier,
                            }));
                        }
                    }
                    for &mine in &player.owned {
                        if !self.group_unimproved(mine) {
                            continue;
                        }
                        out.push(self.codec.encode(Action::OfferExchange {
                            counterpart: slot,
                            offered: mine,
                            requested: ordinal,
                        }));
                    }
                }
                if st.owner == Some(pid) {
                    for tier in 0..tiers {
                        out.push(self.codec.encode(Action::OfferSell {
                            counterpart: slot,
                            property: ordinal,
                            tier,
                        }));
                    }
                }
            }
        }
    }

    // === Bookkeeping ===

    fn counterparts(&self, pid: PlayerId) -> impl Iterator<Item = PlayerId> + '_ {
        PlayerId::all(self.players.len()).filter(move |&p| p != pid)
    }

    fn counterpart(&self, pid: PlayerId, slot: usize) -> Option<PlayerId> {
        self.counterparts(pid).nth(slot)
    }

    fn house_price(&self, ordinal: usize) -> i64 {
        self.catalog.property(ordinal).house_price.unwrap_or(0)
    }

    /// No member of this property's color group carries improvements.
    fn group_unimproved(&self, ordinal: usize) -> bool {
        let group = self.catalog.property(ordinal).group;
        self.catalog
            .group_members(group)
            .iter()
            .all(|&m| self.properties[m].houses == 0)
    }

    fn player_mut(&mut self, pid: PlayerId) -> &mut Player {
        &mut self.players[pid.index()]
    }

    fn update_monopolies(&mut self) {
        let catalog = &self.catalog;
        let properties = &mut self.properties;
        for (_, members) in catalog.groups() {
            let first = properties[members[0]].owner;
            let monopoly =
                first.is_some() && members.iter().all(|&m| properties[m].owner == first);
            for &m in members {
                properties[m].monopoly = monopoly;
            }
        }
    }

    fn reward(&self, pid: PlayerId) -> f64 {
        let alive = self.players.iter().filter(|p| !p.bankrupt).count();
        if alive <= 1 {
            return if self.player(pid).bankrupt { -1.0 } else { 1.0 };
        }
        let own = self.net_worth(pid);
        let others: f64 = self
            .players
            .iter()
            .filter(|p| !p.bankrupt && p.id != pid)
            .map(|p| p.net_worth(&self.catalog, &self.properties))
            .sum();
        if others == 0.0 {
            1.0
        } else {
            own / (others + 1e-8)
        }
    }

    fn check_game_over(&mut self) {
        let alive = self.players.iter().filter(|p| !p.bankrupt).count();
        if alive <= 1 || self.round >= self.max_rounds {
            self.done = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> MonopolyEnv {
        MonopolyEnv::new(42)
    }

    fn info_for(env: &MonopolyEnv) -> StepInfo {
        StepInfo::new(env.whose_turn(), env.phase())
    }

    fn ordinal(env: &MonopolyEnv, square: u8) -> usize {
        env.catalog.property_at(SquareId::new(square)).unwrap()
    }

    #[test]
    fn test_reset_state() {
        let mut env = env();
        env.reset();
        for p in env.players() {
            assert_eq!(p.cash, 1500);
            assert_eq!(p.position, SquareId::new(0));
            assert!(!p.in_jail && !p.bankrupt && !p.jail_card);
        }
        let mut order: Vec<u8> = env.turn_order.iter().map(|p| p.0).collect();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(env.phase(), Phase::PreRoll);
        assert!(!env.done());
        assert_eq!(env.round(), 0);
        assert!(env.properties().iter().all(|p| p.owner.is_none()));
    }

    #[test]
    fn test_movement_wraps_and_pays_salary_once() {
        let mut env = env();
        let pid = env.whose_turn();
        env.phase = Phase::PostRoll;
        env.player_mut(pid).position = SquareId::new(35);

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 3, 4, &mut info);

        assert_eq!(env.player(pid).position, SquareId::new(2));
        assert_eq!(env.player(pid).cash, 1700);
        assert_eq!(info.dice, Some((3, 4)));
        assert_eq!(info.landed_on, Some(SquareId::new(2)));
    }

    #[test]
    fn test_go_to_jail_teleports_without_salary() {
        let mut env = env();
        let pid = env.whose_turn();
        env.phase = Phase::PostRoll;
        env.player_mut(pid).position = SquareId::new(26);

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 1, 3, &mut info);

        let p = env.player(pid);
        assert_eq!(p.position, SquareId::new(10));
        assert!(p.in_jail);
        assert_eq!(p.jail_turns, 0);
        assert_eq!(p.cash, 1500);
    }

    #[test]
    fn test_jail_doubles_free_and_move() {
        let mut env = env();
        let pid = env.whose_turn();
        env.phase = Phase::PostRoll;
        let jail = env.catalog.jail_square();
        {
            let p = env.player_mut(pid);
            p.position = jail;
            p.in_jail = true;
        }

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 2, 2, &mut info);

        let p = env.player(pid);
        assert!(!p.in_jail);
        assert_eq!(p.jail_turns, 0);
        assert_eq!(p.position, SquareId::new(14));
    }

    #[test]
    fn test_jail_holds_without_doubles() {
        let mut env = env();
        let pid = env.whose_turn();
        env.phase = Phase::PostRoll;
        let jail = env.catalog.jail_square();
        {
            let p = env.player_mut(pid);
            p.position = jail;
            p.in_jail = true;
        }

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 1, 2, &mut info);

        let p = env.player(pid);
        assert!(p.in_jail);
        assert_eq!(p.jail_turns, 1);
        assert_eq!(p.position, jail);
        assert!(info.landed_on.is_none());
    }

    #[test]
    fn test_third_jailed_turn_forces_capped_bail() {
        let mut env = env();
        let pid = env.whose_turn();
        env.phase = Phase::PostRoll;
        let jail = env.catalog.jail_square();
        {
            let p = env.player_mut(pid);
            p.position = jail;
            p.in_jail = true;
            p.jail_turns = 2;
            p.cash = 30; // less than the 50 bail
        }

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 1, 2, &mut info);

        let p = env.player(pid);
        assert!(!p.in_jail);
        assert_eq!(p.cash, 0);
        assert_eq!(p.position, SquareId::new(13));
    }

    #[test]
    fn test_tax_floors_at_zero_and_bankrupts() {
        let mut env = env();
        let pid = env.whose_turn();
        env.phase = Phase::PostRoll;
        {
            let p = env.player_mut(pid);
            p.position = SquareId::new(1);
            p.cash = 150;
        }

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 1, 2, &mut info);

        let p = env.player(pid);
        assert_eq!(p.cash, 0);
        assert!(p.bankrupt);
        assert_ne!(env.whose_turn(), pid);
    }

    #[test]
    fn test_rent_capped_and_bankruptcy_returns_properties() {
        let mut env = env();
        let pid = env.whose_turn();
        let owner = env.counterpart(pid, 0).unwrap();
        let boardwalk = ordinal(&env, 39);
        let baltic = ordinal(&env, 3);

        env.properties[boardwalk].owner = Some(owner);
        env.player_mut(owner).acquire(boardwalk);
        env.properties[baltic].owner = Some(pid);
        env.player_mut(pid).acquire(baltic);
        env.player_mut(pid).cash = 20; // rent on Boardwalk is 50
        env.phase = Phase::PostRoll;
        env.player_mut(pid).position = SquareId::new(37);

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 1, 1, &mut info);

        assert_eq!(info.rent_paid, Some(20));
        assert_eq!(env.player(owner).cash, 1520);
        let p = env.player(pid);
        assert!(p.bankrupt);
        assert_eq!(p.cash, 0);
        assert!(p.owned.is_empty());
        assert!(env.property(baltic).owner.is_none());
        assert!(!env.property(baltic).mortgaged);
        assert_eq!(env.property(baltic).houses, 0);
    }

    #[test]
    fn test_landing_on_unowned_property_only_flags_buyability() {
        let mut env = env();
        let pid = env.whose_turn();
        env.phase = Phase::PostRoll;
        env.player_mut(pid).position = SquareId::new(37);

        let mut info = info_for(&env);
        env.advance_and_resolve(pid, 1, 1, &mut info);

        assert!(info.can_buy);
        assert!(env.property(ordinal(&env, 39)).owner.is_none());
        assert_eq!(env.player(pid).cash, 1500);

        // Buying is legal now and resolves through a separate action.
        let buy = env.codec.encode(Action::BuyProperty);
        assert!(env.legal_actions(Some(pid)).contains(&buy));
        let outcome = env.step(buy).unwrap();
        assert!(outcome.info.applied);
        assert_eq!(env.property(ordinal(&env, 39)).owner, Some(pid));
        assert_eq!(env.player(pid).cash, 1100);
    }

    #[test]
    fn test_monopoly_flags_follow_ownership() {
        let mut env = env();
        let pid = PlayerId::new(0);
        let med = ordinal(&env, 1);
        let baltic = ordinal(&env, 3);

        env.properties[med].owner = Some(pid);
        env.update_monopolies();
        assert!(!env.property(med).monopoly);

        env.properties[baltic].owner = Some(pid);
        env.update_monopolies();
        assert!(env.property(med).monopoly);
        assert!(env.property(baltic).monopoly);

        env.properties[baltic].owner = Some(PlayerId::new(1));
        env.update_monopolies();
        assert!(!env.property(med).monopoly);
    }

    #[test]
    fn test_trade_accept_transfers_atomically() {
        let mut env = env();
        let sender = PlayerId::new(0);
        let recipient = PlayerId::new(1);
        let boardwalk = ordinal(&env, 39);

        env.properties[boardwalk].owner = Some(recipient);
        env.player_mut(recipient).acquire(boardwalk);
        env.player_mut(sender).cash = 100;
        env.pending_trades.insert(
            sender,
            TradeOffer {
                sender,
                recipient,
                offered: None,
                requested: Some(boardwalk),
                cash_offered: 400, // more than the sender can pay
                cash_requested: 0,
            },
        );

        env.accept_trade(recipient);

        // Cash leg capped at the sender's 100.
        assert_eq!(env.player(sender).cash, 0);
        assert_eq!(env.player(recipient).cash, 1600);
        assert_eq!(env.property(boardwalk).owner, Some(sender));
        assert!(env.player(sender).owns(boardwalk));
        assert!(!env.player(recipient).owns(boardwalk));
        assert!(env.incoming_trade(recipient).is_none());
    }

    #[test]
    fn test_decline_removes_offer() {
        let mut env = env();
        let sender = PlayerId::new(2);
        let recipient = PlayerId::new(3);
        env.pending_trades.insert(
            sender,
            TradeOffer {
                sender,
                recipient,
                offered: None,
                requested: None,
                cash_offered: 0,
                cash_requested: 0,
            },
        );

        assert!(env.incoming_trade(recipient).is_some());
        env.decline_trade(recipient);
        assert!(env.incoming_trade(recipient).is_none());
        assert!(env.pending_trades.is_empty());
    }

    #[test]
    fn test_phase_cycle_through_end_turns() {
        let mut env = env();
        let active = env.active_player();
        let end = env.codec.encode(Action::EndTurn);

        assert_eq!(env.phase(), Phase::PreRoll);
        env.step(end).unwrap();
        assert_eq!(env.phase(), Phase::PostRoll);
        assert_eq!(env.active_player(), active);

        // Must roll before ending the post-roll phase.
        let roll = env.codec.encode(Action::RollDice);
        assert!(env.legal_actions(None).contains(&roll));
        env.step(roll).unwrap();
        env.step(end).unwrap();
        assert_eq!(env.phase(), Phase::OutOfTurn);
        assert_eq!(env.waiting.len(), 3);
        assert_ne!(env.whose_turn(), active);

        // Each waiting player passes; then the next player's pre-roll.
        env.step(end).unwrap();
        env.step(end).unwrap();
        env.step(end).unwrap();
        assert_eq!(env.phase(), Phase::PreRoll);
        assert_ne!(env.active_player(), active);
    }

    #[test]
    fn test_pending_trades_cleared_on_new_pre_roll() {
        let mut env = env();
        let active = env.active_player();
        let other = env.counterpart(active, 0).unwrap();
        let med = ordinal(&env, 1);
        env.properties[med].owner = Some(active);
        env.player_mut(active).acquire(med);

        let end = env.codec.encode(Action::EndTurn);
        let offer = env.codec.encode(Action::OfferSell {
            counterpart: 0,
            property: med,
            tier: 1,
        });
        env.step(offer).unwrap();
        assert!(env.outgoing_trade(active).is_some());
        assert_eq!(env.incoming_trade(other).map(|o| o.sender), Some(active));

        env.step(end).unwrap(); // pre-roll -> post-roll
        let roll = env.codec.encode(Action::RollDice);
        env.step(roll).unwrap();
        env.step(end).unwrap(); // post-roll -> out-of-turn
        env.step(end).unwrap();
        env.step(end).unwrap();
        env.step(end).unwrap(); // out-of-turn drains -> next pre-roll

        assert_eq!(env.phase(), Phase::PreRoll);
        assert!(env.pending_trades.is_empty());
    }

    #[test]
    fn test_illegal_action_is_noop() {
        let mut env = env();
        let pid = env.whose_turn();
        let before_cash = env.player(pid).cash;

        // Buying is not legal during pre-roll.
        let buy = env.codec.encode(Action::BuyProperty);
        let outcome = env.step(buy).unwrap();
        assert!(!outcome.info.applied);
        assert_eq!(env.player(pid).cash, before_cash);
        assert_eq!(env.phase(), Phase::PreRoll);
    }

    #[test]
    fn test_step_contract_errors() {
        let mut env = env();
        let size = env.codec.space_size();
        assert!(matches!(
            env.step(size),
            Err(EngineError::InvalidAction(_))
        ));

        env.done = true;
        assert_eq!(env.step(0), Err(EngineError::GameFinished));
    }

    #[test]
    fn test_round_limit_terminates_with_net_worth_winner() {
        let mut env = MonopolyEnvBuilder::new().max_rounds(0).build(7);
        // Round counter is already at the limit; first step finishes it.
        let outcome = env.step(env.codec.encode(Action::EndTurn)).unwrap();
        assert!(outcome.done);
        assert!(env.winner().is_some());
    }

    #[test]
    fn test_winner_is_sole_survivor() {
        let mut env = env();
        for pid in [1u8, 2, 3] {
            env.player_mut(PlayerId::new(pid)).bankrupt = true;
        }
        env.check_game_over();
        assert!(env.done());
        assert_eq!(env.winner(), Some(PlayerId::new(0)));
    }

    #[test]
    fn test_reward_ratio_and_elimination() {
        let mut env = env();
        // All equal at reset: reward close to 1/3.
        let r = env.reward(PlayerId::new(0));
        assert!((r - 1.0 / 3.0).abs() < 1e-6);

        for pid in [1u8, 2, 3] {
            env.player_mut(PlayerId::new(pid)).bankrupt = true;
        }
        assert!((env.reward(PlayerId::new(0)) - 1.0).abs() < f64::EPSILON);
        assert!((env.reward(PlayerId::new(1)) + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_legal_actions_never_empty() {
        let env = env();
        for pid in PlayerId::all(NUM_PLAYERS) {
            assert!(!env.legal_actions(Some(pid)).is_empty());
        }
    }

    #[test]
    fn test_out_of_turn_exchange_offer_round_trip() {
        let mut env = env();
        let active = env.active_player();
        let end = env.codec.encode(Action::EndTurn);
        let roll = env.codec.encode(Action::RollDice);
        env.step(end).unwrap();
        env.step(roll).unwrap();
        env.step(end).unwrap();
        assert_eq!(env.phase(), Phase::OutOfTurn);

        let actor = env.whose_turn();
        let med = ordinal(&env, 1);
        let baltic = ordinal(&env, 3);
        env.properties[med].owner = Some(actor);
        env.player_mut(actor).acquire(med);
        env.properties[baltic].owner = Some(active);
        env.player_mut(active).acquire(baltic);
        env.update_monopolies();

        let slot = env
            .counterparts(actor)
            .position(|p| p == active)
            .unwrap();
        let offer = env.codec.encode(Action::OfferExchange {
            counterpart: slot,
            offered: med,
            requested: baltic,
        });
        assert!(env.legal_actions(Some(actor)).contains(&offer));
        let outcome = env.step(offer).unwrap();
        assert!(outcome.info.applied);
        let pending = env.outgoing_trade(actor).unwrap();
        assert_eq!(pending.recipient, active);
        assert_eq!(pending.offered, Some(med));
        assert_eq!(pending.requested, Some(baltic));
    }
}
