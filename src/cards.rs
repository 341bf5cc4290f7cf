//! Utilities for creating cards and decks

use std::fmt;

use crate::game::layout::Vec2;
use crate::game::table::PileId;

pub const RANKS: usize = 13;
pub const SUITS: usize = 4;
pub const DECK_SIZE: usize = RANKS * SUITS;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade
}

impl Suit {
    pub const ALL: [Suit; SUITS] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Diamond | Suit::Heart)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Club => "♣",
            Suit::Diamond => "♦",
            Suit::Heart => "♥",
            Suit::Spade => "♠"
        }
    }
}

/// Card rank. The discriminant is the ordinal used by the rules, Ace = 0 through King = 12.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King
}

impl Rank {
    pub const ALL: [Rank; RANKS] = [
        Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King
    ];

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// True when `self` is exactly one rank above `other`, with no wraparound.
    pub fn is_one_above(self, other: Rank) -> bool {
        self.ordinal() - other.ordinal() == 1
    }

    pub fn label(self) -> &'static str {
        const LABELS: [&str; RANKS] = ["A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K"];
        LABELS[self as usize]
    }
}

/// One of the 52 cards. Identity never changes; everything else is mutated during a round.
#[derive(Debug, Clone)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub face_up: bool,

    /// Pile currently holding the card. Lookup aid only, the pile's sequence owns membership.
    pub pile: Option<PileId>,

    pub pos: Vec2,
    pub target_pos: Vec2,

    /// Offset from the pointer to the card's top left corner while dragging.
    pub drag_offset: Vec2,
    pub pos_before_drag: Vec2,

    /// Only used by the win animation.
    pub vel: Vec2
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Card {
        Card {
            suit,
            rank,
            face_up: false,
            pile: None,
            pos: Vec2::ZERO,
            target_pos: Vec2::ZERO,
            drag_offset: Vec2::ZERO,
            pos_before_drag: Vec2::ZERO,
            vel: Vec2::ZERO
        }
    }

    pub fn is_red(&self) -> bool {
        self.suit.is_red()
    }

    pub fn is_resting(&self) -> bool {
        self.pos == self.target_pos
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// Creates the standard 52 card deck, ordered by suit then rank, all face down.
pub fn new_standard_deck() -> [Card; DECK_SIZE] {
    core::array::from_fn(|i| Card::new(Suit::ALL[i / RANKS], Rank::ALL[i % RANKS]))
}
