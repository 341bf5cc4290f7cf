//! Piles and the cards they hold.
//!
//! Cards live in one fixed array for the whole round and are referred to by
//! index. Each pile owns an ordered list of those indexes, bottom first, so the
//! top of a pile is the last element.

use crate::cards::{new_standard_deck, Card, DECK_SIZE};

use super::layout::{step_towards_target, Layout, Vec2};

pub type CardId = usize;

pub const FOUNDATIONS: usize = 4;
pub const TABLEAU_SIZE: usize = 7;
pub const PILE_COUNT: usize = 2 + FOUNDATIONS + TABLEAU_SIZE;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PileId {
    Stock,
    Waste,
    Foundation(usize),
    Tableau(usize)
}

impl PileId {
    pub fn index(self) -> usize {
        match self {
            PileId::Stock => 0,
            PileId::Waste => 1,
            PileId::Foundation(i) => 2 + i,
            PileId::Tableau(i) => 2 + FOUNDATIONS + i
        }
    }

    pub fn from_index(index: usize) -> PileId {
        match index {
            0 => PileId::Stock,
            1 => PileId::Waste,
            i if i < 2 + FOUNDATIONS => PileId::Foundation(i - 2),
            i => {
                assert!(i < PILE_COUNT, "pile index {} out of range", i);
                PileId::Tableau(i - 2 - FOUNDATIONS)
            }
        }
    }

    pub fn foundations() -> impl Iterator<Item = PileId> {
        (0..FOUNDATIONS).map(PileId::Foundation)
    }

    pub fn tableau() -> impl Iterator<Item = PileId> {
        (0..TABLEAU_SIZE).map(PileId::Tableau)
    }

    pub fn all() -> impl Iterator<Item = PileId> {
        (0..PILE_COUNT).map(PileId::from_index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pile {
    /// Bottom to top.
    pub cards: Vec<CardId>
}

impl Pile {
    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn position_of(&self, card: CardId) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }
}

/// The 52 cards, the 13 piles and the geometry that places them.
#[derive(Debug, Clone)]
pub struct Table {
    pub cards: [Card; DECK_SIZE],
    piles: [Pile; PILE_COUNT],
    pub layout: Layout,
    pub draw_three: bool
}

impl Table {
    /// Creates a table with every card detached. Callers place them with `push`.
    pub fn new(layout: Layout, draw_three: bool) -> Table {
        Table {
            cards: new_standard_deck(),
            piles: Default::default(),
            layout,
            draw_three
        }
    }

    pub fn pile(&self, id: PileId) -> &Pile {
        &self.piles[id.index()]
    }

    pub fn card(&self, id: CardId) -> &Card {
        &self.cards[id]
    }

    pub fn card_mut(&mut self, id: CardId) -> &mut Card {
        &mut self.cards[id]
    }

    pub fn peek_top(&self, pile: PileId) -> Option<CardId> {
        self.pile(pile).peek_top()
    }

    pub fn is_empty(&self, pile: PileId) -> bool {
        self.pile(pile).is_empty()
    }

    pub fn is_top(&self, card: CardId) -> bool {
        self.cards[card].pile.is_some_and(|pile| self.peek_top(pile) == Some(card))
    }

    /// The card directly beneath `card` in its pile.
    pub fn card_below(&self, card: CardId) -> Option<CardId> {
        let pile = self.pile(self.cards[card].pile?);
        let index = pile.position_of(card)?;
        index.checked_sub(1).map(|below| pile.cards[below])
    }

    /// `card` and everything stacked on top of it, bottom to top.
    pub fn run_from(&self, card: CardId) -> &[CardId] {
        match self.cards[card].pile {
            Some(pile_id) => {
                let pile = self.pile(pile_id);
                match pile.position_of(card) {
                    Some(index) => &pile.cards[index..],
                    None => &[]
                }
            }
            None => &[]
        }
    }

    fn target_at(&self, pile: PileId, index: usize) -> Vec2 {
        self.layout.compute_target(pile, &self.pile(pile).cards, index, &self.cards, self.draw_three)
    }

    pub fn push(&mut self, pile: PileId, card: CardId) {
        assert!(self.cards[card].pile.is_none(), "{} pushed while still in {:?}", self.cards[card], self.cards[card].pile);
        self.piles[pile.index()].cards.push(card);
        self.cards[card].pile = Some(pile);
        if pile == PileId::Waste {
            self.retarget_pile(pile);
        } else {
            let index = self.pile(pile).len() - 1;
            self.cards[card].target_pos = self.target_at(pile, index);
        }
    }

    pub fn pop(&mut self, pile: PileId) -> Option<CardId> {
        let card = self.piles[pile.index()].cards.pop()?;
        self.cards[card].pile = None;
        if pile == PileId::Waste {
            self.retarget_pile(pile);
        }
        Some(card)
    }

    /// Moves `card` and every card above it onto `target`, keeping their order.
    pub fn transfer(&mut self, target: PileId, card: CardId) {
        let source = match self.cards[card].pile {
            Some(pile) => pile,
            None => panic!("transfer of {} which is not in any pile", self.cards[card])
        };
        let index = match self.pile(source).position_of(card) {
            Some(index) => index,
            None => panic!("{} claims {:?} but is not in it", self.cards[card], source)
        };

        let run = self.piles[source.index()].cards.split_off(index);
        let start = self.pile(target).len();
        self.piles[target.index()].cards.extend_from_slice(&run);
        for (offset, &moved) in run.iter().enumerate() {
            self.cards[moved].pile = Some(target);
            self.cards[moved].target_pos = self.target_at(target, start + offset);
        }

        if source == PileId::Waste {
            self.retarget_pile(source);
        }
        if target == PileId::Waste {
            self.retarget_pile(target);
        }
    }

    pub fn set_face_up(&mut self, card: CardId, face_up: bool) {
        self.cards[card].face_up = face_up;
    }

    pub fn retarget_pile(&mut self, pile: PileId) {
        for index in 0..self.pile(pile).len() {
            let card = self.pile(pile).cards[index];
            self.cards[card].target_pos = self.target_at(pile, index);
        }
    }

    pub fn retarget_all(&mut self) {
        for pile in PileId::all() {
            self.retarget_pile(pile);
        }
    }

    /// Replaces the geometry and re-derives every target. Membership and faces are untouched.
    pub fn resize(&mut self, layout: Layout) {
        self.layout = layout;
        self.retarget_all();
    }

    pub fn step_towards_target(&mut self, held: &[CardId], rate: f32, dt: f32) -> bool {
        step_towards_target(&mut self.cards, held, rate, dt)
    }

    /// Checks that the piles hold every card exactly once and that the back
    /// references agree. `detached` cards are allowed to be outside every pile.
    pub fn check_deck(&self, detached: &[CardId]) -> Result<(), String> {
        let mut seen = [false; DECK_SIZE];
        for pile in PileId::all() {
            for &card in &self.pile(pile).cards {
                if seen[card] {
                    return Err(format!("{} appears twice", self.cards[card]));
                }
                seen[card] = true;
                if self.cards[card].pile != Some(pile) {
                    return Err(format!("{} is in {:?} but points at {:?}", self.cards[card], pile, self.cards[card].pile));
                }
            }
        }
        for (card, &present) in seen.iter().enumerate() {
            if !present && !detached.contains(&card) {
                return Err(format!("{} is missing", self.cards[card]));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut table = Table::new(Layout::new(1000.0, 750.0), false);
        for card in 0..DECK_SIZE {
            table.push(PileId::Stock, card);
        }
        table
    }

    #[test]
    fn pile_index_round_trip() {
        for (i, pile) in PileId::all().enumerate() {
            assert_eq!(pile.index(), i);
        }
        assert_eq!(PileId::from_index(5), PileId::Foundation(3));
        assert_eq!(PileId::from_index(6), PileId::Tableau(0));
    }

    #[test]
    fn push_pop_peek() {
        let mut table = table();
        assert_eq!(table.pile(PileId::Stock).len(), DECK_SIZE);
        assert_eq!(table.peek_top(PileId::Stock), Some(DECK_SIZE - 1));
        let card = table.pop(PileId::Stock).unwrap();
        assert_eq!(card, DECK_SIZE - 1);
        assert_eq!(table.card(card).pile, None);
        assert_eq!(table.pop(PileId::Waste), None);
        assert!(table.is_empty(PileId::Waste));
        table.push(PileId::Waste, card);
        assert_eq!(table.card(card).pile, Some(PileId::Waste));
        assert_eq!(table.card(card).target_pos, table.layout.anchor(PileId::Waste));
        assert!(table.check_deck(&[]).is_ok());
    }

    #[test]
    fn transfer_keeps_run_order() {
        let mut table = table();
        for _ in 0..5 {
            let card = table.pop(PileId::Stock).unwrap();
            table.push(PileId::Tableau(0), card);
        }
        let before = table.pile(PileId::Tableau(0)).cards.clone();
        table.transfer(PileId::Tableau(3), before[2]);
        assert_eq!(table.pile(PileId::Tableau(0)).cards, &before[..2]);
        assert_eq!(table.pile(PileId::Tableau(3)).cards, &before[2..]);
        for &card in &before[2..] {
            assert_eq!(table.card(card).pile, Some(PileId::Tableau(3)));
        }
        assert!(table.check_deck(&[]).is_ok());
    }

    #[test]
    fn transfer_onto_tableau_cascades_targets() {
        let mut table = table();
        let a = table.pop(PileId::Stock).unwrap();
        let b = table.pop(PileId::Stock).unwrap();
        table.push(PileId::Tableau(1), a);
        table.set_face_up(a, true);
        table.push(PileId::Tableau(1), b);
        table.transfer(PileId::Tableau(4), a);
        let anchor = table.layout.anchor(PileId::Tableau(4));
        assert_eq!(table.card(a).target_pos, anchor);
        assert!(table.card(b).target_pos.y > anchor.y);
    }

    #[test]
    fn leaving_waste_refans_the_rest() {
        let mut table = table();
        table.draw_three = true;
        let drawn: Vec<CardId> = (0..4).map(|_| table.pop(PileId::Stock).unwrap()).collect();
        for &card in &drawn {
            table.push(PileId::Waste, card);
        }
        let anchor = table.layout.anchor(PileId::Waste);
        assert_eq!(table.card(drawn[0]).target_pos, anchor);
        assert_eq!(table.card(drawn[1]).target_pos, anchor);
        table.transfer(PileId::Tableau(0), drawn[3]);
        assert_eq!(table.card(drawn[0]).target_pos, anchor);
        assert!(table.card(drawn[1]).target_pos.x > anchor.x);
        assert!(table.card(drawn[2]).target_pos.x > table.card(drawn[1]).target_pos.x);
    }

    #[test]
    #[should_panic]
    fn transfer_of_detached_card_panics() {
        let mut table = table();
        let card = table.pop(PileId::Stock).unwrap();
        table.transfer(PileId::Waste, card);
    }

    #[test]
    fn deck_check_spots_missing_cards() {
        let mut table = table();
        let card = table.pop(PileId::Stock).unwrap();
        assert!(table.check_deck(&[]).is_err());
        assert!(table.check_deck(&[card]).is_ok());
    }

    #[test]
    fn resize_keeps_membership() {
        let mut table = table();
        let card = table.pop(PileId::Stock).unwrap();
        table.push(PileId::Foundation(2), card);
        table.resize(Layout::new(640.0, 480.0));
        assert_eq!(table.card(card).pile, Some(PileId::Foundation(2)));
        assert_eq!(table.card(card).target_pos, table.layout.anchor(PileId::Foundation(2)));
        assert!(table.check_deck(&[]).is_ok());
    }
}
