use std::fmt::{self, Display, Formatter};

pub type CardId = String;

/// Pack/pick position in a draft. `0/0` means nothing has been observed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackCoordinate {
    pub pack: u32,
    pub pick: u32,
}

impl PackCoordinate {
    pub fn new(pack: u32, pick: u32) -> Self {
        PackCoordinate { pack, pick }
    }

    pub fn is_unset(&self) -> bool {
        self.pack == 0 && self.pick == 0
    }

    /// Seat holding the pack at this pick: `(pick - 1) mod seat_count`.
    pub fn seat(&self, seat_count: usize) -> usize {
        seat_index(self.pick, seat_count)
    }
}

impl Display for PackCoordinate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "p{}p{}", self.pack, self.pick)
    }
}

pub fn seat_index(pick: u32, seat_count: usize) -> usize {
    if seat_count == 0 {
        return 0;
    }
    (pick.saturating_sub(1) as usize) % seat_count
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatPack {
    /// Contents when this seat's pack was first seen at the current pack number.
    pub initial: Vec<CardId>,
    /// Latest observed contents.
    pub current: Vec<CardId>,
}

/// Per-seat pack contents, sized once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatPacks {
    seats: Vec<SeatPack>,
}

impl SeatPacks {
    pub fn new(seat_count: usize) -> Self {
        SeatPacks {
            seats: vec![SeatPack::default(); seat_count.max(1)],
        }
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn seat(&self, index: usize) -> &SeatPack {
        &self.seats[index % self.seats.len()]
    }

    pub fn clear_initial(&mut self) {
        self.seats.iter_mut().for_each(|seat| seat.initial.clear());
    }

    /// Records an observation: `initial` is only filled while still empty, `current` always.
    pub fn observe(&mut self, index: usize, cards: Vec<CardId>) {
        let len = self.seats.len();
        let seat = &mut self.seats[index % len];
        if seat.initial.is_empty() {
            seat.initial = cards.clone();
        }
        seat.current = cards;
    }

    /// Replaces both snapshots of a seat, discarding whatever was there.
    pub fn overwrite(&mut self, index: usize, cards: Vec<CardId>) {
        let len = self.seats.len();
        let seat = &mut self.seats[index % len];
        seat.initial = cards.clone();
        seat.current = cards;
    }

    /// Cards present when the pack was first seen but gone from it now.
    pub fn missing(&self, index: usize) -> Vec<CardId> {
        let seat = self.seat(index);
        seat.initial
            .iter()
            .filter(|card| !seat.current.contains(card))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRecord {
    pub coordinate: PackCoordinate,
    pub cards: Vec<CardId>,
}

/// Everything the player has taken this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickHistory {
    pub records: Vec<PickRecord>,
    pub pool: Vec<CardId>,
    picked_this_pack: Vec<Vec<CardId>>,
    /// Coordinate of the most recent pick line.
    pub last_pick: PackCoordinate,
}

impl PickHistory {
    pub fn new(seat_count: usize) -> Self {
        PickHistory {
            records: Vec::new(),
            pool: Vec::new(),
            picked_this_pack: vec![Vec::new(); seat_count.max(1)],
            last_pick: PackCoordinate::default(),
        }
    }

    pub fn record(&mut self, coordinate: PackCoordinate, cards: Vec<CardId>) {
        let seat_count = self.picked_this_pack.len();
        if coordinate.pack != self.last_pick.pack {
            self.picked_this_pack.iter_mut().for_each(|bucket| bucket.clear());
        }

        let seat = coordinate.seat(seat_count);
        self.picked_this_pack[seat].extend(cards.iter().cloned());
        self.pool.extend(cards.iter().cloned());
        self.records.push(PickRecord { coordinate, cards });
        self.last_pick = coordinate;
    }

    /// Fills the pool from an external source, only when nothing is known yet.
    pub fn seed_pool(&mut self, cards: Vec<CardId>) -> bool {
        if !self.pool.is_empty() || cards.is_empty() {
            return false;
        }
        self.pool = cards;
        true
    }

    pub fn picked_this_pack(&self, seat: usize) -> &[CardId] {
        &self.picked_this_pack[seat % self.picked_this_pack.len()]
    }
}
