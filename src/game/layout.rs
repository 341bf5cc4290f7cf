//! Table geometry and card motion.
//!
//! Anchors are derived from the viewport size. Every card has a target position
//! computed from its pile and its place in that pile; the animation step moves
//! each card a fraction of its remaining distance towards that target every frame.

use std::ops::{Add, AddAssign, Mul, Sub};

use crate::cards::Card;

use super::table::{CardId, PileId, FOUNDATIONS, TABLEAU_SIZE};

pub const CARD_ASPECT: f32 = 560.0 / 780.0;
pub const STOCK_OFFSET_BETWEEN_CARDS: f32 = 0.5;
pub const WASTE_FAN_OFFSET: f32 = 0.2;
pub const TABLEAU_FACE_UP_OFFSET: f32 = 0.25;
pub const TABLEAU_FACE_DOWN_OFFSET: f32 = 0.125;
pub const WASTE_VISIBLE_CARDS: usize = 3;

/// Distance under which a moving card snaps onto its target.
pub const SNAP_DISTANCE: f32 = 0.5;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Vec2 {
        Vec2 { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Rect {
        Rect { x: pos.x, y: pos.y, w: size.x, h: size.y }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.w, self.y),
            Vec2::new(self.x, self.y + self.h),
            Vec2::new(self.x + self.w, self.y + self.h)
        ]
    }

    /// True when any corner of `self` lies inside `other`.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.corners().iter().any(|&corner| other.contains(corner))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub frame_size: Vec2,
    pub board_margin: Vec2,
    pub card_width: f32,
    pub card_height: f32,
    pub card_margin_x: f32,
    pub tableau_margin_top: f32
}

impl Layout {
    pub fn new(width: f32, height: f32) -> Layout {
        let board_margin = Vec2::new(50.0, 25.0);
        let card_width = (width * 0.75) / TABLEAU_SIZE as f32;
        Layout {
            frame_size: Vec2::new(width, height),
            board_margin,
            card_width,
            card_height: card_width / CARD_ASPECT,
            card_margin_x: ((width * 0.25) - 2.0 * board_margin.x) / (TABLEAU_SIZE - 1) as f32,
            tableau_margin_top: 25.0
        }
    }

    pub fn card_size(&self) -> Vec2 {
        Vec2::new(self.card_width, self.card_height)
    }

    pub fn card_rect(&self, pos: Vec2) -> Rect {
        Rect::new(pos, self.card_size())
    }

    fn column_x(&self, column: usize) -> f32 {
        self.board_margin.x + column as f32 * (self.card_width + self.card_margin_x)
    }

    pub fn anchor(&self, pile: PileId) -> Vec2 {
        let top = self.board_margin.y;
        let tableau_top = top + self.card_height + self.tableau_margin_top;
        match pile {
            PileId::Stock => Vec2::new(self.column_x(0), top),
            PileId::Waste => Vec2::new(self.column_x(1), top),
            PileId::Foundation(i) => {
                debug_assert!(i < FOUNDATIONS);
                Vec2::new(self.column_x(i + 3), top)
            }
            PileId::Tableau(i) => Vec2::new(self.column_x(i), tableau_top)
        }
    }

    /// Target position of the card at `index` (0 = bottom) of `pile`, whose
    /// contents bottom to top are `ids`.
    pub fn compute_target(&self, pile: PileId, ids: &[CardId], index: usize, cards: &[Card], draw_three: bool) -> Vec2 {
        let anchor = self.anchor(pile);
        match pile {
            PileId::Stock => {
                let depth = index as f32 * STOCK_OFFSET_BETWEEN_CARDS;
                anchor - Vec2::new(depth, depth)
            }
            PileId::Waste => {
                let first_visible = ids.len().saturating_sub(WASTE_VISIBLE_CARDS);
                if draw_three && index >= first_visible {
                    let slot = (index - first_visible) as f32;
                    anchor + Vec2::new(slot * WASTE_FAN_OFFSET * self.card_width, 0.0)
                } else {
                    anchor
                }
            }
            PileId::Foundation(_) => anchor,
            PileId::Tableau(_) => {
                let y_offset: f32 = ids[..index]
                    .iter()
                    .map(|&id| if cards[id].face_up { TABLEAU_FACE_UP_OFFSET } else { TABLEAU_FACE_DOWN_OFFSET })
                    .sum::<f32>() * self.card_height;
                anchor + Vec2::new(0.0, y_offset)
            }
        }
    }
}

/// Moves every card not in `held` towards its target by `rate * dt` of the
/// remaining distance, snapping when close. Returns true while anything is still moving.
pub fn step_towards_target(cards: &mut [Card], held: &[CardId], rate: f32, dt: f32) -> bool {
    let fraction = (rate * dt).clamp(0.0, 1.0);
    let mut moving = false;
    for (id, card) in cards.iter_mut().enumerate() {
        if card.pile.is_none() || card.pos == card.target_pos || held.contains(&id) {
            continue;
        }
        let remaining = card.target_pos - card.pos;
        if remaining.length() <= SNAP_DISTANCE {
            card.pos = card.target_pos;
        } else {
            card.pos += remaining * fraction;
            moving = true;
        }
    }
    moving
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    fn layout() -> Layout {
        Layout::new(1000.0, 750.0)
    }

    #[test]
    fn layout_follows_viewport() {
        let l = layout();
        assert!((l.card_width - 750.0 / 7.0).abs() < 1e-3);
        assert!((l.card_height - l.card_width / CARD_ASPECT).abs() < 1e-3);
        assert_eq!(l.anchor(PileId::Stock), Vec2::new(50.0, 25.0));
        assert_eq!(l.anchor(PileId::Foundation(0)).x, l.anchor(PileId::Tableau(3)).x);
        assert!(l.anchor(PileId::Tableau(0)).y > l.anchor(PileId::Stock).y + l.card_height);
    }

    #[test]
    fn tableau_offsets_depend_on_face() {
        let l = layout();
        let mut cards = vec![Card::new(Suit::Club, Rank::Two), Card::new(Suit::Heart, Rank::Three), Card::new(Suit::Spade, Rank::Four)];
        cards[1].face_up = true;
        let ids = [0, 1, 2];
        let anchor = l.anchor(PileId::Tableau(2));
        let second = l.compute_target(PileId::Tableau(2), &ids, 1, &cards, false);
        let third = l.compute_target(PileId::Tableau(2), &ids, 2, &cards, false);
        assert_eq!(l.compute_target(PileId::Tableau(2), &ids, 0, &cards, false), anchor);
        assert!((second.y - anchor.y - TABLEAU_FACE_DOWN_OFFSET * l.card_height).abs() < 1e-3);
        assert!((third.y - second.y - TABLEAU_FACE_UP_OFFSET * l.card_height).abs() < 1e-3);
    }

    #[test]
    fn waste_fans_top_three_only_in_draw_three() {
        let l = layout();
        let cards: Vec<Card> = (0..5).map(|i| Card::new(Suit::Club, Rank::ALL[i])).collect();
        let ids = [0, 1, 2, 3, 4];
        let anchor = l.anchor(PileId::Waste);
        assert_eq!(l.compute_target(PileId::Waste, &ids, 1, &cards, true), anchor);
        assert_eq!(l.compute_target(PileId::Waste, &ids, 2, &cards, true), anchor);
        let top = l.compute_target(PileId::Waste, &ids, 4, &cards, true);
        assert!((top.x - anchor.x - 2.0 * WASTE_FAN_OFFSET * l.card_width).abs() < 1e-3);
        assert_eq!(l.compute_target(PileId::Waste, &ids, 4, &cards, false), anchor);
    }

    #[test]
    fn stock_steps_diagonally() {
        let l = layout();
        let cards: Vec<Card> = (0..3).map(|i| Card::new(Suit::Club, Rank::ALL[i])).collect();
        let target = l.compute_target(PileId::Stock, &[0, 1, 2], 2, &cards, false);
        assert_eq!(target, l.anchor(PileId::Stock) - Vec2::new(1.0, 1.0));
    }

    #[test]
    fn step_is_exponential_and_snaps() {
        let mut cards = vec![Card::new(Suit::Club, Rank::Ace)];
        cards[0].pile = Some(PileId::Stock);
        cards[0].target_pos = Vec2::new(100.0, 0.0);

        assert!(step_towards_target(&mut cards, &[], 10.0, 0.05));
        assert!((cards[0].pos.x - 50.0).abs() < 1e-3);
        assert!(step_towards_target(&mut cards, &[], 10.0, 0.05));
        assert!((cards[0].pos.x - 75.0).abs() < 1e-3);

        cards[0].pos = Vec2::new(99.8, 0.0);
        assert!(!step_towards_target(&mut cards, &[], 10.0, 0.05));
        assert_eq!(cards[0].pos, cards[0].target_pos);
        assert!(!step_towards_target(&mut cards, &[], 10.0, 0.05));
    }

    #[test]
    fn held_cards_do_not_move() {
        let mut cards = vec![Card::new(Suit::Club, Rank::Ace)];
        cards[0].pile = Some(PileId::Stock);
        cards[0].target_pos = Vec2::new(100.0, 0.0);
        assert!(!step_towards_target(&mut cards, &[0], 10.0, 0.05));
        assert_eq!(cards[0].pos, Vec2::ZERO);
    }

    #[test]
    fn corner_overlap() {
        let a = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
        let b = Rect { x: 8.0, y: 8.0, w: 10.0, h: 10.0 };
        let c = Rect { x: 20.0, y: 0.0, w: 10.0, h: 10.0 };
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }
}
