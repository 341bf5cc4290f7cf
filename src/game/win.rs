//! Cards bouncing off the table after a win. Purely cosmetic.

use circular_buffer::CircularBuffer;
use log::{debug, warn};

use crate::random::Pcg32;

use super::layout::Vec2;
use super::table::{CardId, PileId, Table, FOUNDATIONS};

pub const GRAVITY: f32 = 2000.0;
pub const RESTITUTION: f32 = 0.75;
pub const TOSS_VELOCITY_Y: f32 = 100.0;
pub const MIN_SPEED_X: u32 = 150;
pub const MAX_SPEED_X: u32 = 450;
pub const TRAIL_CAPACITY: usize = 1024;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrailMark {
    pub card: CardId,
    pub pos: Vec2
}

pub struct WinAnimation {
    next_foundation: usize,
    pub moving: Option<CardId>,
    /// Cards that have left the table for good.
    pub retired: Vec<CardId>,
    pub trail: CircularBuffer<TRAIL_CAPACITY, TrailMark>,
    overflow_logged: bool
}

impl Default for WinAnimation {
    fn default() -> Self {
        WinAnimation {
            next_foundation: 0,
            moving: None,
            retired: Vec::new(),
            trail: CircularBuffer::new(),
            overflow_logged: false
        }
    }
}

impl WinAnimation {
    pub fn is_finished(&self, table: &Table) -> bool {
        self.moving.is_none() && PileId::foundations().all(|pile| table.is_empty(pile))
    }

    /// Cards outside every pile while the animation runs.
    pub fn detached(&self) -> Vec<CardId> {
        self.retired.iter().copied().chain(self.moving).collect()
    }

    fn launch_next(&mut self, table: &mut Table, rng: &mut Pcg32) {
        for _ in 0..FOUNDATIONS {
            let pile = PileId::Foundation(self.next_foundation);
            self.next_foundation = (self.next_foundation + 1) % FOUNDATIONS;
            if let Some(card) = table.pop(pile) {
                let speed = rng.range(MIN_SPEED_X, MAX_SPEED_X) as f32;
                let direction = if rng.next_float() < 0.5 { -1.0 } else { 1.0 };
                table.card_mut(card).vel = Vec2::new(speed * direction, TOSS_VELOCITY_Y);
                debug!("launching {}", table.card(card));
                self.moving = Some(card);
                return;
            }
        }
    }

    pub fn update(&mut self, table: &mut Table, rng: &mut Pcg32, dt: f32) {
        if self.moving.is_none() {
            self.launch_next(table, rng);
        }
        let Some(card_id) = self.moving else {
            return;
        };

        let frame = table.layout.frame_size;
        let size = table.layout.card_size();
        let card = table.card_mut(card_id);
        card.vel.y += GRAVITY * dt;
        card.pos += card.vel * dt;
        let floor = frame.y - size.y;
        if card.pos.y > floor {
            card.pos.y = floor;
            card.vel.y = -card.vel.y * RESTITUTION;
        }
        let pos = card.pos;
        let gone = pos.x + size.x < 0.0 || pos.x > frame.x;

        if self.trail.is_full() && !self.overflow_logged {
            warn!("win trail full, dropping oldest marks");
            self.overflow_logged = true;
        }
        self.trail.push_back(TrailMark { card: card_id, pos });

        if gone {
            self.retired.push(card_id);
            self.moving = None;
        }
    }
}
