//! Legality checks. Nothing in here mutates the table.

use crate::cards::{Card, Rank};

use super::table::{CardId, PileId, Table};

pub fn opposite_color(a: &Card, b: &Card) -> bool {
    a.is_red() != b.is_red()
}

/// `upper` may sit on `lower` in a tableau run.
fn stacks_on(upper: &Card, lower: &Card) -> bool {
    opposite_color(upper, lower) && lower.rank.is_one_above(upper.rank)
}

pub fn can_drag(table: &Table, card: CardId) -> bool {
    let Some(pile) = table.card(card).pile else {
        return false;
    };
    let run = table.run_from(card);
    if !table.card(card).face_up || run.iter().any(|&c| !table.card(c).is_resting()) {
        return false;
    }
    match pile {
        PileId::Stock => false,
        PileId::Waste | PileId::Foundation(_) => run.len() == 1,
        PileId::Tableau(_) => run.windows(2).all(|pair| stacks_on(table.card(pair[1]), table.card(pair[0])))
    }
}

pub fn can_drop_on_card(table: &Table, dragged: CardId, target: CardId) -> bool {
    let (moving, below) = (table.card(dragged), table.card(target));
    let Some(target_pile) = below.pile else {
        return false;
    };
    if moving.pile == Some(target_pile) || !below.face_up || !table.is_top(target) {
        return false;
    }
    match target_pile {
        PileId::Foundation(_) => {
            table.is_top(dragged) && moving.suit == below.suit && moving.rank.is_one_above(below.rank)
        }
        PileId::Tableau(_) => stacks_on(moving, below),
        PileId::Stock | PileId::Waste => false
    }
}

/// Empty tableau columns take any card in draw-one but only a King in draw-three.
pub fn can_drop_on_empty_pile(table: &Table, dragged: CardId, pile: PileId) -> bool {
    if !table.is_empty(pile) {
        return false;
    }
    let rank = table.card(dragged).rank;
    match pile {
        PileId::Foundation(_) => rank == Rank::Ace && table.is_top(dragged),
        PileId::Tableau(_) => !table.draw_three || rank == Rank::King,
        PileId::Stock | PileId::Waste => false
    }
}

pub fn can_drop_on_pile(table: &Table, dragged: CardId, pile: PileId) -> bool {
    match table.peek_top(pile) {
        Some(top) => can_drop_on_card(table, dragged, top),
        None => can_drop_on_empty_pile(table, dragged, pile)
    }
}

/// First foundation that legally accepts `card` on its own.
pub fn foundation_for(table: &Table, card: CardId) -> Option<PileId> {
    if !table.is_top(card) || !table.card(card).face_up {
        return None;
    }
    PileId::foundations().find(|&pile| can_drop_on_pile(table, card, pile))
}

/// Where a released drag lands: foundations first, then tableau, by index.
/// The dragged card must overlap the candidate before legality is checked.
pub fn drop_target(table: &Table, dragged: CardId) -> Option<PileId> {
    let dragged_rect = table.layout.card_rect(table.card(dragged).pos);
    PileId::foundations().chain(PileId::tableau()).find(|&pile| {
        let landing = match table.peek_top(pile) {
            Some(top) => table.card(top).pos,
            None => table.layout.anchor(pile)
        };
        dragged_rect.overlaps(&table.layout.card_rect(landing)) && can_drop_on_pile(table, dragged, pile)
    })
}

/// Stock and waste are empty and every tableau column is a face-up run, so the
/// rest of the game is a sequence of foundation moves.
pub fn is_autocomplete_possible(table: &Table) -> bool {
    if !table.is_empty(PileId::Stock) || !table.is_empty(PileId::Waste) {
        return false;
    }
    PileId::tableau().all(|pile| {
        let cards = &table.pile(pile).cards;
        cards.iter().all(|&c| table.card(c).face_up)
            && cards.windows(2).all(|pair| stacks_on(table.card(pair[1]), table.card(pair[0])))
    })
}

pub fn is_won(table: &Table) -> bool {
    PileId::foundations().all(|pile| {
        table.peek_top(pile).is_some_and(|top| table.card(top).rank == Rank::King)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Suit, RANKS};
    use crate::game::layout::Layout;

    fn id(suit: Suit, rank: Rank) -> CardId {
        suit as usize * RANKS + rank as usize
    }

    /// Every card starts detached; tests place what they need.
    fn table(draw_three: bool) -> Table {
        Table::new(Layout::new(1000.0, 750.0), draw_three)
    }

    fn place(table: &mut Table, pile: PileId, card: CardId, face_up: bool) {
        table.push(pile, card);
        table.set_face_up(card, face_up);
        let target = table.card(card).target_pos;
        table.card_mut(card).pos = target;
    }

    #[test]
    fn colors() {
        let t = table(false);
        assert!(opposite_color(t.card(id(Suit::Club, Rank::Ace)), t.card(id(Suit::Heart, Rank::Ace))));
        assert!(!opposite_color(t.card(id(Suit::Club, Rank::Ace)), t.card(id(Suit::Spade, Rank::Ace))));
        assert!(!opposite_color(t.card(id(Suit::Diamond, Rank::Ace)), t.card(id(Suit::Heart, Rank::Ace))));
    }

    #[test]
    fn drag_needs_an_ordered_face_up_run() {
        let mut t = table(false);
        let column = PileId::Tableau(0);
        place(&mut t, column, id(Suit::Club, Rank::Nine), false);
        place(&mut t, column, id(Suit::Spade, Rank::Eight), true);
        place(&mut t, column, id(Suit::Heart, Rank::Seven), true);
        place(&mut t, column, id(Suit::Club, Rank::Six), true);

        assert!(can_drag(&t, id(Suit::Spade, Rank::Eight)));
        assert!(can_drag(&t, id(Suit::Club, Rank::Six)));
        assert!(!can_drag(&t, id(Suit::Club, Rank::Nine)));

        place(&mut t, column, id(Suit::Spade, Rank::Five), true);
        assert!(!can_drag(&t, id(Suit::Spade, Rank::Eight)));
        assert!(can_drag(&t, id(Suit::Spade, Rank::Five)));
    }

    #[test]
    fn drag_waits_for_animation() {
        let mut t = table(false);
        let card = id(Suit::Heart, Rank::Four);
        place(&mut t, PileId::Tableau(2), card, true);
        assert!(can_drag(&t, card));
        t.card_mut(card).pos.x += 10.0;
        assert!(!can_drag(&t, card));
    }

    #[test]
    fn stock_is_never_dragged_and_waste_only_from_top() {
        let mut t = table(false);
        let top = id(Suit::Spade, Rank::King);
        place(&mut t, PileId::Stock, top, true);
        assert!(!can_drag(&t, top));

        let (a, b) = (id(Suit::Heart, Rank::Two), id(Suit::Club, Rank::Ace));
        place(&mut t, PileId::Waste, a, true);
        place(&mut t, PileId::Waste, b, true);
        assert!(can_drag(&t, b));
        assert!(!can_drag(&t, a));
    }

    #[test]
    fn tableau_drop() {
        let mut t = table(false);
        place(&mut t, PileId::Tableau(0), id(Suit::Spade, Rank::Eight), true);
        place(&mut t, PileId::Tableau(1), id(Suit::Heart, Rank::Seven), true);
        place(&mut t, PileId::Tableau(2), id(Suit::Club, Rank::Seven), true);
        place(&mut t, PileId::Tableau(3), id(Suit::Diamond, Rank::Six), true);

        let target = id(Suit::Spade, Rank::Eight);
        assert!(can_drop_on_card(&t, id(Suit::Heart, Rank::Seven), target));
        assert!(!can_drop_on_card(&t, id(Suit::Club, Rank::Seven), target));
        assert!(!can_drop_on_card(&t, id(Suit::Diamond, Rank::Six), target));
    }

    #[test]
    fn foundation_drop_needs_single_card_same_suit_next_rank() {
        let mut t = table(false);
        place(&mut t, PileId::Foundation(0), id(Suit::Heart, Rank::Ace), true);
        place(&mut t, PileId::Tableau(0), id(Suit::Heart, Rank::Two), true);
        place(&mut t, PileId::Tableau(1), id(Suit::Diamond, Rank::Two), true);
        let ace = id(Suit::Heart, Rank::Ace);

        assert!(can_drop_on_card(&t, id(Suit::Heart, Rank::Two), ace));
        assert!(!can_drop_on_card(&t, id(Suit::Diamond, Rank::Two), ace));

        place(&mut t, PileId::Tableau(0), id(Suit::Spade, Rank::Ace), true);
        assert!(!can_drop_on_card(&t, id(Suit::Heart, Rank::Two), ace));
    }

    #[test]
    fn empty_pile_rules_differ_by_mode() {
        for draw_three in [false, true] {
            let mut t = table(draw_three);
            let king = id(Suit::Club, Rank::King);
            let queen = id(Suit::Heart, Rank::Queen);
            let ace = id(Suit::Spade, Rank::Ace);
            place(&mut t, PileId::Tableau(0), king, true);
            place(&mut t, PileId::Tableau(1), queen, true);
            place(&mut t, PileId::Tableau(2), ace, true);

            assert!(can_drop_on_empty_pile(&t, king, PileId::Tableau(6)));
            assert_eq!(can_drop_on_empty_pile(&t, queen, PileId::Tableau(6)), !draw_three);
            assert!(can_drop_on_empty_pile(&t, ace, PileId::Foundation(3)));
            assert!(!can_drop_on_empty_pile(&t, king, PileId::Foundation(3)));
            assert!(!can_drop_on_empty_pile(&t, king, PileId::Tableau(1)));
        }
    }

    #[test]
    fn predicates_do_not_touch_the_table() {
        let mut t = table(false);
        place(&mut t, PileId::Tableau(0), id(Suit::Spade, Rank::Eight), true);
        place(&mut t, PileId::Tableau(1), id(Suit::Heart, Rank::Seven), true);
        let before: Vec<Vec<CardId>> = PileId::all().map(|p| t.pile(p).cards.clone()).collect();
        for _ in 0..3 {
            can_drag(&t, id(Suit::Heart, Rank::Seven));
            can_drop_on_card(&t, id(Suit::Heart, Rank::Seven), id(Suit::Spade, Rank::Eight));
            can_drop_on_empty_pile(&t, id(Suit::Heart, Rank::Seven), PileId::Tableau(5));
            drop_target(&t, id(Suit::Heart, Rank::Seven));
        }
        let after: Vec<Vec<CardId>> = PileId::all().map(|p| t.pile(p).cards.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn drop_target_needs_overlap() {
        let mut t = table(false);
        let eight = id(Suit::Spade, Rank::Eight);
        let seven = id(Suit::Heart, Rank::Seven);
        place(&mut t, PileId::Tableau(0), eight, true);
        place(&mut t, PileId::Tableau(4), seven, true);
        assert_eq!(drop_target(&t, seven), None);

        let over = t.card(eight).pos + crate::game::layout::Vec2::new(5.0, 20.0);
        t.card_mut(seven).pos = over;
        assert_eq!(drop_target(&t, seven), Some(PileId::Tableau(0)));
    }

    #[test]
    fn foundation_is_checked_first() {
        let mut t = table(false);
        let ace = id(Suit::Club, Rank::Ace);
        place(&mut t, PileId::Tableau(3), ace, true);
        assert_eq!(foundation_for(&t, ace), Some(PileId::Foundation(0)));
        t.card_mut(ace).pos = t.layout.anchor(PileId::Foundation(1));
        assert_eq!(drop_target(&t, ace), Some(PileId::Foundation(1)));
    }

    #[test]
    fn autocomplete_needs_empty_stock_and_waste() {
        let mut t = table(false);
        let mut column = 0;
        for suit in Suit::ALL {
            for rank in Rank::ALL.iter().rev() {
                place(&mut t, PileId::Tableau(column), id(suit, *rank), true);
            }
            column += 1;
        }
        assert!(!is_autocomplete_possible(&t));

        let mut t = table(false);
        let pairs = [(Suit::Spade, Suit::Heart), (Suit::Club, Suit::Diamond)];
        for (column, (black, red)) in pairs.iter().enumerate() {
            for rank in Rank::ALL.iter().rev() {
                let suit = if rank.ordinal() % 2 == 0 { *black } else { *red };
                place(&mut t, PileId::Tableau(column * 2), id(suit, *rank), true);
                let other = if rank.ordinal() % 2 == 0 { *red } else { *black };
                place(&mut t, PileId::Tableau(column * 2 + 1), id(other, *rank), true);
            }
        }
        assert!(t.is_empty(PileId::Stock));
        assert!(is_autocomplete_possible(&t));

        let spare = id(Suit::Spade, Rank::Two);
        t.transfer(PileId::Waste, spare);
        assert!(!is_autocomplete_possible(&t));
    }

    #[test]
    fn won_when_every_foundation_ends_in_a_king() {
        let mut t = table(false);
        for (i, suit) in Suit::ALL.iter().enumerate() {
            for rank in Rank::ALL {
                place(&mut t, PileId::Foundation(i), id(*suit, rank), true);
            }
        }
        assert!(is_won(&t));
        t.transfer(PileId::Tableau(0), id(Suit::Club, Rank::King));
        assert!(!is_won(&t));
    }
}
