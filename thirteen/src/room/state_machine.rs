//! Room state machine.
//!
//! [`Room`] is the single owner of a room's seats, deck and history. It's
//! synchronous and clock-agnostic: every operation takes the current time,
//! and [`Room::settle`] runs whatever transitions have come due. The room
//! actor is the only writer.
//!
//! Phases run `waiting -> dealing -> arranging -> submitted -> revealing`,
//! then back to `dealing` for the next round or on to `match_complete`.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tokio::time::Instant;
use uuid::Uuid;

use super::{
    config::RoomConfig,
    errors::{InvalidStateTransitionError, RoomError, RoomId, RoomResult, SeatTimeoutError},
    messages::{RoomEvent, RoomSummary, RoomView, SeatView, Standing},
    states::{
        Arranging, Dealing, MatchComplete, PhaseName, PhaseRules, Revealing, RoomPhase, Submitted,
        Waiting,
    },
};
use crate::game::{
    arrangement::Validation,
    entities::{Arrangement, Card, Deck, Lane, PlayerId, Points, SeatIndex},
    errors::MalformedArrangementError,
    scoring::{PairResult, SeatHand, score_room},
    sorter,
};

/// Upper bound on transitions run by one [`Room::settle`] call.
const MAX_SETTLE_STEPS: usize = 16;

/// One occupied seat.
#[derive(Clone, Debug)]
pub struct Seat {
    pub player: PlayerId,
    pub ready: bool,
    pub connected: bool,
    /// Left mid-round; the seat frees up once the round is revealed
    pub departed: bool,
    pub dealt: Vec<Card>,
    pub draft: Option<Arrangement>,
    pub hand: Option<SeatHand>,
    pub timeout: Option<SeatTimeoutError>,
    pub points: Points,
    /// Played by the room itself; always ready, plays the suggested arrangement
    pub bot: bool,
}

impl Seat {
    fn new(player: PlayerId) -> Self {
        Self {
            player,
            ready: false,
            connected: true,
            departed: false,
            dealt: Vec::new(),
            draft: None,
            hand: None,
            timeout: None,
            points: 0,
            bot: false,
        }
    }

    fn bot(player: PlayerId) -> Self {
        Self {
            ready: true,
            bot: true,
            ..Self::new(player)
        }
    }
}

/// What one seat played in a round and what it earned.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatOutcome {
    pub seat: SeatIndex,
    pub player: PlayerId,
    pub hand: SeatHand,
    pub timeout: Option<SeatTimeoutError>,
    pub points: Points,
}

/// Immutable record of a scored round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundResult {
    pub id: Uuid,
    pub round: u32,
    pub recorded_at: DateTime<Utc>,
    pub seats: Vec<SeatOutcome>,
    pub pairs: Vec<PairResult>,
    pub home_runs: Vec<SeatIndex>,
}

impl RoundResult {
    #[must_use]
    pub fn outcome(&self, seat: SeatIndex) -> Option<&SeatOutcome> {
        self.seats.iter().find(|outcome| outcome.seat == seat)
    }
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    phase: RoomPhase,
    seats: Vec<Option<Seat>>,
    round: u32,
    rng: StdRng,
    history: Vec<RoundResult>,
    events: VecDeque<RoomEvent>,
    had_players: bool,
    next_bot_id: u32,
}

impl Room {
    pub fn new(id: RoomId, config: RoomConfig) -> RoomResult<Self> {
        config.validate()?;
        let rng = match config.deck_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut room = Self {
            id,
            seats: vec![None; config.seats],
            phase: RoomPhase::default(),
            round: 0,
            rng,
            history: Vec::new(),
            events: VecDeque::new(),
            had_players: false,
            next_bot_id: 1,
            config,
        };
        for idx in 0..room.config.bots {
            let player = room.bot_name();
            room.seats[idx] = Some(Seat::bot(player));
        }
        Ok(room)
    }

    #[must_use]
    pub fn id(&self) -> RoomId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> PhaseName {
        self.phase.name()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.phase.deadline()
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    #[must_use]
    pub fn seat(&self, seat: SeatIndex) -> Option<&Seat> {
        self.seats.get(seat).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn seat_of(&self, player: &PlayerId) -> Option<SeatIndex> {
        self.seats
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| &s.player == player && !s.departed))
    }

    fn occupied(&self) -> impl Iterator<Item = (SeatIndex, &Seat)> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(idx, seat)| seat.as_ref().map(|s| (idx, s)))
    }

    #[must_use]
    pub fn seats_taken(&self) -> usize {
        self.occupied().count()
    }

    /// Every human who joined has since left. Bots don't keep a room alive.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.had_players && self.humans().all(|(_, s)| s.departed)
    }

    fn humans(&self) -> impl Iterator<Item = (SeatIndex, &Seat)> {
        self.occupied().filter(|(_, s)| !s.bot)
    }

    /// The match is over and past its retention window.
    #[must_use]
    pub fn is_reclaimable(&self, now: Instant) -> bool {
        matches!(&self.phase, RoomPhase::MatchComplete(p) if now >= p.reclaim_at)
    }

    pub fn drain_events(&mut self) -> VecDeque<RoomEvent> {
        std::mem::take(&mut self.events)
    }

    fn reject(&self, attempted: &str) -> RoomError {
        let err = InvalidStateTransitionError {
            phase: self.phase.name(),
            attempted: attempted.to_string(),
        };
        warn!("room {}: {err}", self.id);
        err.into()
    }

    fn seat_mut(&mut self, seat: SeatIndex) -> RoomResult<&mut Seat> {
        self.seats
            .get_mut(seat)
            .and_then(Option::as_mut)
            .filter(|s| !s.departed)
            .ok_or(RoomError::EmptySeat(seat))
    }

    fn transition(&mut self, next: RoomPhase) {
        let from = self.phase.name();
        let to = next.name();
        self.phase = next;
        info!("room {}: {from} -> {to}", self.id);
        self.events.push_back(RoomEvent::RoomStateChanged { from, to });
    }

    /// Seat a player in the first free seat.
    pub fn join(&mut self, player: PlayerId, now: Instant) -> RoomResult<SeatIndex> {
        if !self.phase.accepts_joins() {
            return Err(self.reject("join"));
        }
        if self.seat_of(&player).is_some() {
            return Err(RoomError::AlreadySeated(player.to_string()));
        }
        let idx = self
            .seats
            .iter()
            .position(Option::is_none)
            .ok_or(RoomError::RoomFull)?;
        self.seats[idx] = Some(Seat::new(player.clone()));
        self.had_players = true;
        info!("room {}: {player} took seat {idx}", self.id);
        self.events
            .push_back(RoomEvent::PlayerJoined { seat: idx, player });
        self.arm_ready_deadline(now);
        Ok(idx)
    }

    /// Fill the first free seat with a bot. Bots are ready at once.
    pub fn add_bot(&mut self, now: Instant) -> RoomResult<SeatIndex> {
        if !self.phase.accepts_joins() {
            return Err(self.reject("add a bot"));
        }
        let idx = self
            .seats
            .iter()
            .position(Option::is_none)
            .ok_or(RoomError::RoomFull)?;
        let player = self.bot_name();
        self.seats[idx] = Some(Seat::bot(player.clone()));
        info!("room {}: {player} took seat {idx}", self.id);
        self.events
            .push_back(RoomEvent::PlayerJoined { seat: idx, player });
        self.events.push_back(RoomEvent::PlayerReady { seat: idx });
        self.arm_ready_deadline(now);
        Ok(idx)
    }

    // Bot ids skip any name a human already holds.
    fn bot_name(&mut self) -> PlayerId {
        loop {
            let player = PlayerId::new(&format!("bot-{}", self.next_bot_id));
            self.next_bot_id += 1;
            if self.seat_of(&player).is_none() {
                return player;
            }
        }
    }

    /// Leave a seat. Before the deal the seat frees up at once; after it,
    /// an unsubmitted hand is forfeited and the seat is freed when the
    /// round ends.
    pub fn leave(&mut self, seat: SeatIndex, now: Instant) -> RoomResult<()> {
        let phase = self.phase.name();
        let round = self.round;
        let occupant = self.seat_mut(seat)?;
        let player = occupant.player.clone();
        match phase {
            PhaseName::Waiting | PhaseName::MatchComplete => {
                self.seats[seat] = None;
            }
            _ => {
                occupant.departed = true;
                occupant.connected = false;
                if occupant.hand.is_none() && !occupant.dealt.is_empty() {
                    occupant.hand = Some(SeatHand::forfeit(
                        &occupant.dealt,
                        occupant.draft.as_ref(),
                    ));
                    info!("room {}: seat {seat} forfeited round {round} by leaving", self.id);
                }
            }
        }
        info!("room {}: {player} left seat {seat}", self.id);
        self.events.push_back(RoomEvent::PlayerLeft { seat, player });
        if phase == PhaseName::Waiting {
            self.arm_ready_deadline(now);
        }
        Ok(())
    }

    pub fn set_ready(&mut self, seat: SeatIndex) -> RoomResult<()> {
        if !self.phase.accepts_ready() {
            return Err(self.reject("ready up"));
        }
        let occupant = self.seat_mut(seat)?;
        if !occupant.ready {
            occupant.ready = true;
            self.events.push_back(RoomEvent::PlayerReady { seat });
        }
        Ok(())
    }

    /// Take back a ready flag. Only possible until the deal.
    pub fn set_unready(&mut self, seat: SeatIndex) -> RoomResult<()> {
        if !self.phase.accepts_ready() {
            return Err(self.reject("cancel ready"));
        }
        let occupant = self.seat_mut(seat)?;
        if occupant.ready {
            occupant.ready = false;
            self.events.push_back(RoomEvent::PlayerUnready { seat });
        }
        Ok(())
    }

    /// Submit an arrangement for the current round. Malformed arrangements
    /// are rejected without touching the room; fouls are accepted.
    pub fn submit_arrangement(
        &mut self,
        seat: SeatIndex,
        arrangement: Arrangement,
    ) -> RoomResult<Validation> {
        if !self.phase.accepts_arrangement() {
            return Err(self.reject("submit an arrangement"));
        }
        let specials = self.config.scoring.specials.clone();
        let id = self.id;
        let occupant = self.seat_mut(seat)?;
        if occupant.hand.is_some() {
            return Err(RoomError::AlreadySubmitted(seat));
        }
        let hand = SeatHand::evaluate(arrangement, &occupant.dealt, &specials).inspect_err(|e| {
            debug!("room {id}: seat {seat} sent a malformed arrangement: {e}");
        })?;
        let validation = Validation {
            ranks: hand.ranks.clone(),
            foul: hand.foul,
        };
        if let Some(foul) = hand.foul {
            warn!("room {id}: seat {seat} submitted a foul: {foul}");
        }
        occupant.hand = Some(hand);
        occupant.draft = None;
        self.events.push_back(RoomEvent::ArrangementSubmitted {
            seat,
            foul: validation.foul,
        });
        Ok(validation)
    }

    /// Save a partial arrangement. Lanes may be short, but every card must
    /// be the seat's own and appear once.
    pub fn save_draft(&mut self, seat: SeatIndex, arrangement: Arrangement) -> RoomResult<()> {
        if !self.phase.accepts_arrangement() {
            return Err(self.reject("save a draft"));
        }
        let occupant = self.seat_mut(seat)?;
        if occupant.hand.is_some() {
            return Err(RoomError::AlreadySubmitted(seat));
        }
        for lane in Lane::ALL {
            let actual = arrangement.lane(lane).len();
            if actual > lane.size() {
                return Err(MalformedArrangementError::LaneSize {
                    lane,
                    expected: lane.size(),
                    actual,
                }
                .into());
            }
        }
        let mut seen = BTreeSet::new();
        for card in arrangement.cards() {
            if !seen.insert(*card) {
                return Err(MalformedArrangementError::DuplicateCard(*card).into());
            }
            if !occupant.dealt.contains(card) {
                return Err(MalformedArrangementError::ForeignCard(*card).into());
            }
        }
        occupant.draft = Some(arrangement);
        Ok(())
    }

    pub fn disconnect(&mut self, seat: SeatIndex) -> RoomResult<()> {
        let occupant = self.seat_mut(seat)?;
        if occupant.connected {
            occupant.connected = false;
            self.events
                .push_back(RoomEvent::PlayerDisconnected { seat });
        }
        Ok(())
    }

    pub fn reconnect(&mut self, seat: SeatIndex) -> RoomResult<()> {
        let occupant = self.seat_mut(seat)?;
        if !occupant.connected {
            occupant.connected = true;
            self.events.push_back(RoomEvent::PlayerReconnected { seat });
        }
        Ok(())
    }

    /// Best non-fouling arrangement of the seat's current cards.
    pub fn suggest(&mut self, seat: SeatIndex) -> RoomResult<Arrangement> {
        if !self.phase.accepts_arrangement() {
            return Err(self.reject("request a suggestion"));
        }
        let occupant = self.seat_mut(seat)?;
        sorter::suggest(&occupant.dealt).ok_or(RoomError::EmptySeat(seat))
    }

    // Start or clear the ready clock depending on whether the room is full.
    fn arm_ready_deadline(&mut self, now: Instant) {
        let full = self.seats.iter().all(Option::is_some);
        let timeout = self.config.ready_timeout();
        if let RoomPhase::Waiting(waiting) = &mut self.phase {
            match (full, timeout) {
                (true, Some(timeout)) if waiting.ready_deadline.is_none() => {
                    waiting.ready_deadline = Some(now + timeout);
                }
                (false, _) => waiting.ready_deadline = None,
                _ => {}
            }
        }
    }

    /// Run every transition that's due. Returns how many ran.
    pub fn settle(&mut self, now: Instant) -> usize {
        let mut steps = 0;
        while steps < MAX_SETTLE_STEPS && self.advance(now) {
            steps += 1;
        }
        steps
    }

    /// Run at most one phase transition. Returns whether one happened.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.phase.name() {
            PhaseName::Waiting => self.advance_waiting(now),
            PhaseName::Dealing => self.deal(now),
            PhaseName::Arranging => self.advance_arranging(now),
            PhaseName::Submitted => self.score(now),
            PhaseName::Revealing => self.advance_revealing(now),
            PhaseName::MatchComplete => false,
        }
    }

    fn advance_waiting(&mut self, now: Instant) -> bool {
        let full = self.seats.iter().all(Option::is_some);
        let all_ready = full && self.occupied().all(|(_, s)| s.ready);
        if all_ready {
            self.transition(Dealing {}.into());
            return true;
        }

        let expired = matches!(
            self.phase.deadline(),
            Some(deadline) if now >= deadline
        );
        if expired {
            for idx in 0..self.seats.len() {
                let unready = self.seats[idx].as_ref().is_some_and(|s| !s.ready);
                if unready && let Some(seat) = self.seats[idx].take() {
                    info!("room {}: released unready {} from seat {idx}", self.id, seat.player);
                    self.events.push_back(RoomEvent::SeatReleased {
                        seat: idx,
                        player: seat.player,
                    });
                }
            }
            if let RoomPhase::Waiting(waiting) = &mut self.phase {
                waiting.ready_deadline = None;
            }
        }
        self.arm_ready_deadline(now);
        false
    }

    fn deal(&mut self, now: Instant) -> bool {
        let active: Vec<SeatIndex> = self.occupied().map(|(idx, _)| idx).collect();
        let deck = Deck::new().shuffled(&mut self.rng);
        let hands = match deck.deal_hands(active.len()) {
            Ok(hands) => hands,
            Err(e) => {
                error!("room {}: {e}", self.id);
                let reclaim_at = now + self.config.retention();
                self.transition(MatchComplete { reclaim_at }.into());
                return true;
            }
        };

        self.round += 1;
        for (idx, cards) in active.into_iter().zip(hands) {
            if let Some(seat) = self.seats[idx].as_mut() {
                seat.dealt = cards;
                seat.draft = None;
                seat.hand = None;
                seat.timeout = None;
            }
        }
        debug!("room {}: dealt round {}", self.id, self.round);
        let deadline = now + self.config.arrange_timeout();
        self.transition(Arranging { deadline }.into());
        self.play_bots();
        true
    }

    // Bots lock in the suggested arrangement as soon as they see their cards.
    fn play_bots(&mut self) {
        let specials = &self.config.scoring.specials;
        for (idx, slot) in self.seats.iter_mut().enumerate() {
            let Some(seat) = slot.as_mut().filter(|s| s.bot && s.hand.is_none()) else {
                continue;
            };
            let arrangement = sorter::suggest(&seat.dealt)
                .unwrap_or_else(|| Arrangement::from_dealt_order(&seat.dealt));
            let hand = SeatHand::evaluate(arrangement, &seat.dealt, specials)
                .unwrap_or_else(|_| SeatHand::forfeit(&seat.dealt, None));
            debug!("room {}: {} arranged round {}", self.id, seat.player, self.round);
            let foul = hand.foul;
            seat.hand = Some(hand);
            self.events
                .push_back(RoomEvent::ArrangementSubmitted { seat: idx, foul });
        }
    }

    fn advance_arranging(&mut self, now: Instant) -> bool {
        let all_in = self.occupied().all(|(_, s)| s.hand.is_some());
        if all_in {
            self.transition(Submitted {}.into());
            return true;
        }

        let expired = matches!(self.phase.deadline(), Some(deadline) if now >= deadline);
        if !expired {
            return false;
        }

        let round = self.round;
        for (idx, slot) in self.seats.iter_mut().enumerate() {
            let Some(seat) = slot.as_mut() else {
                continue;
            };
            if seat.hand.is_some() {
                continue;
            }
            let timeout = SeatTimeoutError { seat: idx, round };
            info!("room {}: {timeout}", self.id);
            seat.hand = Some(SeatHand::forfeit(&seat.dealt, seat.draft.as_ref()));
            seat.timeout = Some(timeout);
            self.events.push_back(RoomEvent::SeatTimedOut(timeout));
        }
        self.transition(Submitted {}.into());
        true
    }

    fn score(&mut self, now: Instant) -> bool {
        let hands: BTreeMap<SeatIndex, SeatHand> = self
            .occupied()
            .filter_map(|(idx, s)| s.hand.clone().map(|hand| (idx, hand)))
            .collect();
        let score = score_room(&hands, &self.config.scoring);

        let mut outcomes = Vec::with_capacity(hands.len());
        for (idx, hand) in hands {
            let points = score.net.get(&idx).copied().unwrap_or_default();
            if let Some(seat) = self.seats[idx].as_mut() {
                seat.points = seat.points.saturating_add(points);
                outcomes.push(SeatOutcome {
                    seat: idx,
                    player: seat.player.clone(),
                    hand,
                    timeout: seat.timeout,
                    points,
                });
            }
        }

        let result = RoundResult {
            id: Uuid::new_v4(),
            round: self.round,
            recorded_at: Utc::now(),
            seats: outcomes,
            pairs: score.pairs,
            home_runs: score.home_runs,
        };
        info!(
            "room {}: round {} scored, net {:?}",
            self.id, self.round, score.net
        );
        self.history.push(result.clone());
        self.events.push_back(RoomEvent::RoundCompleted(result));

        let until = now + self.config.reveal_duration();
        self.transition(Revealing { until }.into());
        true
    }

    fn advance_revealing(&mut self, now: Instant) -> bool {
        let due = matches!(self.phase.deadline(), Some(until) if now >= until);
        if !due {
            return false;
        }

        for slot in &mut self.seats {
            if slot.as_ref().is_some_and(|s| s.departed) {
                *slot = None;
            }
        }

        let humans_left = self.humans().next().is_some();
        if self.round >= self.config.rounds || self.seats_taken() < 2 || !humans_left {
            let standings = self.standings();
            let reclaim_at = now + self.config.retention();
            self.transition(MatchComplete { reclaim_at }.into());
            self.events
                .push_back(RoomEvent::MatchCompleted { standings });
        } else {
            self.transition(Dealing {}.into());
        }
        true
    }

    /// Cumulative points of everyone still seated.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        self.occupied()
            .map(|(idx, s)| Standing {
                seat: idx,
                player: s.player.clone(),
                points: s.points,
                stake_total: s.points.saturating_mul(self.config.stake_unit),
            })
            .collect()
    }

    /// The room as one seat (or a spectator, for `None`) may see it.
    #[must_use]
    pub fn view(&self, viewer: Option<SeatIndex>, now: Instant) -> RoomView {
        let seats = self
            .seats
            .iter()
            .enumerate()
            .map(|(idx, slot)| match slot {
                Some(s) => SeatView {
                    seat: idx,
                    player: Some(s.player.clone()),
                    ready: s.ready,
                    connected: s.connected,
                    submitted: s.hand.is_some(),
                    points: s.points,
                    bot: s.bot,
                },
                None => SeatView {
                    seat: idx,
                    player: None,
                    ready: false,
                    connected: false,
                    submitted: false,
                    points: 0,
                    bot: false,
                },
            })
            .collect();

        let own = viewer.and_then(|idx| self.seat(idx));
        let in_round = matches!(
            self.phase.name(),
            PhaseName::Arranging | PhaseName::Submitted | PhaseName::Revealing
        );
        RoomView {
            room_id: self.id,
            name: self.config.name.clone(),
            phase: self.phase.name(),
            round: self.round,
            rounds: self.config.rounds,
            deadline_secs: self
                .phase
                .deadline()
                .map(|d| d.saturating_duration_since(now).as_secs()),
            seats,
            your_seat: viewer.filter(|idx| self.seat(*idx).is_some()),
            your_cards: own
                .filter(|_| in_round)
                .map(|s| s.dealt.clone())
                .unwrap_or_default(),
            your_draft: own.and_then(|s| s.draft.clone()),
            your_submission: own.and_then(|s| s.hand.as_ref().map(|h| h.arrangement.clone())),
            last_result: self.history.last().cloned(),
            standings: self.standings(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            name: self.config.name.clone(),
            seats_taken: self.seats_taken(),
            seats: self.config.seats,
            phase: self.phase.name(),
            round: self.round,
            rounds: self.config.rounds,
            speed: self.config.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::errors::FoulError;
    use std::time::Duration;

    fn config(seats: usize, rounds: u32) -> RoomConfig {
        RoomConfig {
            seats,
            rounds,
            deck_seed: Some(7),
            ready_timeout_secs: Some(30),
            arrange_timeout_secs: Some(60),
            reveal_secs: 3,
            retention_secs: 10,
            ..RoomConfig::default()
        }
    }

    fn started(seats: usize, rounds: u32, now: Instant) -> Room {
        let mut room = Room::new(1, config(seats, rounds)).unwrap();
        for i in 0..seats {
            let seat = room.join(PlayerId::new(&format!("p{i}")), now).unwrap();
            room.set_ready(seat).unwrap();
        }
        room.settle(now);
        room
    }

    fn suggested(room: &mut Room, seat: SeatIndex) -> Arrangement {
        room.suggest(seat).unwrap()
    }

    #[test]
    fn test_full_ready_room_deals() {
        let now = Instant::now();
        let room = started(2, 1, now);
        assert_eq!(room.phase(), PhaseName::Arranging);
        assert_eq!(room.round(), 1);
        for idx in 0..2 {
            assert_eq!(room.seat(idx).unwrap().dealt.len(), 13);
        }
    }

    #[test]
    fn test_room_waits_until_everyone_is_ready() {
        let now = Instant::now();
        let mut room = Room::new(1, config(2, 1)).unwrap();
        let a = room.join(PlayerId::new("a"), now).unwrap();
        room.join(PlayerId::new("b"), now).unwrap();
        room.set_ready(a).unwrap();
        assert_eq!(room.settle(now), 0);
        assert_eq!(room.phase(), PhaseName::Waiting);
    }

    #[test]
    fn test_unready_holds_back_the_deal() {
        let now = Instant::now();
        let mut room = Room::new(1, config(2, 1)).unwrap();
        let a = room.join(PlayerId::new("a"), now).unwrap();
        let b = room.join(PlayerId::new("b"), now).unwrap();
        room.set_ready(a).unwrap();
        room.set_unready(a).unwrap();
        room.set_ready(b).unwrap();
        assert_eq!(room.settle(now), 0);
        assert_eq!(room.phase(), PhaseName::Waiting);
        assert!(!room.seat(a).unwrap().ready);
        assert!(
            room.drain_events()
                .contains(&RoomEvent::PlayerUnready { seat: a })
        );

        room.set_ready(a).unwrap();
        room.settle(now);
        assert_eq!(room.phase(), PhaseName::Arranging);
        assert!(matches!(
            room.set_unready(a),
            Err(RoomError::InvalidStateTransition(_))
        ));
        assert!(room.seat(a).unwrap().ready);
    }

    #[test]
    fn test_bots_play_the_suggested_arrangement() {
        let now = Instant::now();
        let mut room = Room::new(
            1,
            RoomConfig {
                bots: 3,
                ..config(4, 1)
            },
        )
        .unwrap();
        assert_eq!(room.seats_taken(), 3);
        assert!(!room.is_abandoned());

        let human = room.join(PlayerId::new("bot-1"), now);
        assert!(matches!(human, Err(RoomError::AlreadySeated(_))));
        let human = room.join(PlayerId::new("human"), now).unwrap();
        assert_eq!(human, 3);
        room.set_ready(human).unwrap();
        room.settle(now);
        assert_eq!(room.phase(), PhaseName::Arranging);
        for idx in 0..3 {
            let bot = room.seat(idx).unwrap();
            assert!(bot.bot);
            assert!(bot.hand.as_ref().is_some_and(|h| h.foul.is_none()));
        }

        let arrangement = suggested(&mut room, human);
        room.submit_arrangement(human, arrangement).unwrap();
        room.settle(now);
        let result = room.history().last().unwrap();
        assert_eq!(result.seats.len(), 4);
        assert_eq!(result.seats.iter().map(|o| o.points).sum::<Points>(), 0);

        room.settle(now + Duration::from_secs(3));
        assert_eq!(room.phase(), PhaseName::MatchComplete);
        assert_eq!(room.standings().len(), 4);
    }

    #[test]
    fn test_bots_alone_end_the_match() {
        let now = Instant::now();
        let mut room = Room::new(1, config(2, 5)).unwrap();
        let human = room.join(PlayerId::new("human"), now).unwrap();
        let bot = room.add_bot(now).unwrap();
        assert_eq!(room.seat(bot).unwrap().player, PlayerId::new("bot-1"));
        room.set_ready(human).unwrap();
        room.settle(now);
        assert_eq!(room.phase(), PhaseName::Arranging);

        room.leave(human, now).unwrap();
        assert!(room.is_abandoned());
        room.settle(now);
        assert_eq!(room.phase(), PhaseName::Revealing);
        room.settle(now + Duration::from_secs(3));
        assert_eq!(room.phase(), PhaseName::MatchComplete);
        assert_eq!(room.round(), 1);
    }

    #[test]
    fn test_join_rules() {
        let now = Instant::now();
        let mut room = Room::new(1, config(2, 1)).unwrap();
        room.join(PlayerId::new("a"), now).unwrap();
        assert_eq!(
            room.join(PlayerId::new("a"), now),
            Err(RoomError::AlreadySeated("a".to_string()))
        );
        room.join(PlayerId::new("b"), now).unwrap();
        assert_eq!(room.join(PlayerId::new("c"), now), Err(RoomError::RoomFull));
    }

    #[test]
    fn test_submit_outside_arranging_is_rejected() {
        let now = Instant::now();
        let mut room = Room::new(1, config(2, 1)).unwrap();
        let seat = room.join(PlayerId::new("a"), now).unwrap();
        let err = room
            .submit_arrangement(seat, Arrangement::default())
            .unwrap_err();
        assert!(matches!(err, RoomError::InvalidStateTransition(_)));
        assert_eq!(room.phase(), PhaseName::Waiting);
    }

    #[test]
    fn test_malformed_submission_leaves_room_unchanged() {
        let now = Instant::now();
        let mut room = started(2, 1, now);
        let dealt = room.seat(0).unwrap().dealt.clone();
        let bad = Arrangement::new(
            dealt[..4].to_vec(),
            dealt[4..8].to_vec(),
            dealt[8..].to_vec(),
        );
        room.drain_events();
        let err = room.submit_arrangement(0, bad).unwrap_err();
        assert!(matches!(err, RoomError::Malformed(_)));
        assert!(room.seat(0).unwrap().hand.is_none());
        assert!(room.drain_events().is_empty());
        assert_eq!(room.phase(), PhaseName::Arranging);
    }

    #[test]
    fn test_round_scores_and_reveals() {
        let now = Instant::now();
        let mut room = started(2, 2, now);
        for seat in 0..2 {
            let arrangement = suggested(&mut room, seat);
            let validation = room.submit_arrangement(seat, arrangement).unwrap();
            assert!(!validation.is_foul());
        }
        room.settle(now);
        assert_eq!(room.phase(), PhaseName::Revealing);
        assert_eq!(room.history().len(), 1);
        let result = &room.history()[0];
        let total: Points = result.seats.iter().map(|o| o.points).sum();
        assert_eq!(total, 0);

        room.settle(now + Duration::from_secs(3));
        assert_eq!(room.phase(), PhaseName::Arranging);
        assert_eq!(room.round(), 2);
    }

    #[test]
    fn test_double_submit_rejected() {
        let now = Instant::now();
        let mut room = started(2, 1, now);
        let arrangement = suggested(&mut room, 0);
        room.submit_arrangement(0, arrangement.clone()).unwrap();
        assert_eq!(
            room.submit_arrangement(0, arrangement),
            Err(RoomError::AlreadySubmitted(0))
        );
    }

    #[test]
    fn test_deadline_forfeits_missing_seats() {
        let now = Instant::now();
        let mut room = started(2, 1, now);
        let arrangement = suggested(&mut room, 0);
        room.submit_arrangement(0, arrangement).unwrap();
        room.disconnect(1).unwrap();

        assert_eq!(room.settle(now + Duration::from_secs(59)), 0);
        room.settle(now + Duration::from_secs(60));
        assert_eq!(room.phase(), PhaseName::Revealing);

        let result = room.history().last().unwrap();
        let forfeited = result.outcome(1).unwrap();
        assert_eq!(forfeited.hand.foul, Some(FoulError::Forfeit));
        assert_eq!(
            forfeited.timeout,
            Some(SeatTimeoutError { seat: 1, round: 1 })
        );
        assert!(result.outcome(0).unwrap().points > 0);
    }

    #[test]
    fn test_leaving_mid_round_forfeits_and_frees_seat_after_reveal() {
        let now = Instant::now();
        let mut room = started(2, 3, now);
        let arrangement = suggested(&mut room, 0);
        room.submit_arrangement(0, arrangement).unwrap();
        room.leave(1, now).unwrap();
        room.settle(now);
        assert_eq!(room.phase(), PhaseName::Revealing);
        assert_eq!(room.seats_taken(), 2);

        room.settle(now + Duration::from_secs(3));
        assert_eq!(room.phase(), PhaseName::MatchComplete);
        assert_eq!(room.seats_taken(), 1);
    }

    #[test]
    fn test_leaving_before_deal_frees_seat() {
        let now = Instant::now();
        let mut room = Room::new(1, config(2, 1)).unwrap();
        let seat = room.join(PlayerId::new("a"), now).unwrap();
        room.leave(seat, now).unwrap();
        assert_eq!(room.seats_taken(), 0);
        assert!(room.is_abandoned());
    }

    #[test]
    fn test_ready_deadline_releases_unready_seats() {
        let now = Instant::now();
        let mut room = Room::new(1, config(2, 1)).unwrap();
        let a = room.join(PlayerId::new("a"), now).unwrap();
        room.join(PlayerId::new("b"), now).unwrap();
        room.set_ready(a).unwrap();
        assert_eq!(room.deadline(), Some(now + Duration::from_secs(30)));

        room.settle(now + Duration::from_secs(30));
        assert_eq!(room.phase(), PhaseName::Waiting);
        assert_eq!(room.seats_taken(), 1);
        assert!(room.seat(a).is_some());
        assert_eq!(room.deadline(), None);
    }

    #[test]
    fn test_match_completes_after_last_round() {
        let now = Instant::now();
        let mut room = started(2, 1, now);
        for seat in 0..2 {
            let arrangement = suggested(&mut room, seat);
            room.submit_arrangement(seat, arrangement).unwrap();
        }
        room.settle(now);
        room.settle(now + Duration::from_secs(3));
        assert_eq!(room.phase(), PhaseName::MatchComplete);
        assert!(!room.is_reclaimable(now + Duration::from_secs(12)));
        assert!(room.is_reclaimable(now + Duration::from_secs(13)));

        let events = room.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, RoomEvent::MatchCompleted { .. }))
        );
    }

    #[test]
    fn test_every_transition_emits_state_change() {
        let now = Instant::now();
        let mut room = started(2, 1, now);
        let events = room.drain_events();
        let changes: Vec<(PhaseName, PhaseName)> = events
            .iter()
            .filter_map(|e| match e {
                RoomEvent::RoomStateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            changes,
            vec![
                (PhaseName::Waiting, PhaseName::Dealing),
                (PhaseName::Dealing, PhaseName::Arranging),
            ]
        );
    }

    #[test]
    fn test_view_hides_other_hands() {
        let now = Instant::now();
        let room = started(2, 1, now);
        let mine = room.view(Some(0), now);
        assert_eq!(mine.your_seat, Some(0));
        assert_eq!(mine.your_cards, room.seat(0).unwrap().dealt);
        let spectator = room.view(None, now);
        assert!(spectator.your_cards.is_empty());
        assert_eq!(spectator.deadline_secs, Some(60));
    }

    #[test]
    fn test_drafts_are_checked_and_used_on_timeout() {
        let now = Instant::now();
        let mut room = started(2, 1, now);
        let dealt = room.seat(1).unwrap().dealt.clone();
        let foreign = room.seat(0).unwrap().dealt[0];
        let bad = Arrangement::new(vec![foreign], vec![], vec![]);
        assert!(matches!(
            room.save_draft(1, bad),
            Err(RoomError::Malformed(MalformedArrangementError::ForeignCard(_)))
        ));

        let draft = suggested(&mut room, 1);
        room.save_draft(1, draft.clone()).unwrap();
        let arrangement = suggested(&mut room, 0);
        room.submit_arrangement(0, arrangement).unwrap();
        room.settle(now + Duration::from_secs(60));

        let outcome = room.history()[0].outcome(1).unwrap().clone();
        assert_eq!(outcome.hand.arrangement, draft);
        assert_eq!(outcome.hand.foul, Some(FoulError::Forfeit));
        assert_eq!(dealt.len(), 13);
    }

    #[test]
    fn test_standings_weighted_by_stake() {
        let now = Instant::now();
        let mut cfg = config(2, 1);
        cfg.stake_unit = 10;
        let mut room = Room::new(1, cfg).unwrap();
        for name in ["a", "b"] {
            let seat = room.join(PlayerId::new(name), now).unwrap();
            room.set_ready(seat).unwrap();
        }
        room.settle(now);
        let arrangement = suggested(&mut room, 0);
        room.submit_arrangement(0, arrangement).unwrap();
        room.settle(now + Duration::from_secs(60));
        let standings = room.standings();
        for standing in standings {
            assert_eq!(standing.stake_total, standing.points * 10);
        }
    }
}
