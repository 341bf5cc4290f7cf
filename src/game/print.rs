use std::io::{self, Write};

use crossterm::{cursor, style::{self, Color, Print}, terminal, QueueableCommand};

use crate::cards::{Rank, Suit};

use super::layout::{Rect, Vec2};
use super::table::PileId;
use super::{Game, State, CARD_BACKS};

/// Pixels covered by one terminal cell. The host converts mouse cells with these.
pub const CELL_WIDTH: f32 = 8.0;
pub const CELL_HEIGHT: f32 = 16.0;

const MIN_CARD_COLUMNS: i32 = 5;
const MIN_CARD_ROWS: i32 = 3;

const BACK_PATTERNS: [char; CARD_BACKS] = ['▒', '░', '▓', '╳', '◆', '•'];
const BACK_COLORS: [Color; CARD_BACKS] = [
    Color::Blue,
    Color::DarkCyan,
    Color::DarkGreen,
    Color::DarkMagenta,
    Color::DarkYellow,
    Color::Red
];

const RULES_DRAW_ONE: &str = "\
Klondike, draw one

Build the four foundations up by suit from Ace to King.
Tableau columns build down in alternating colours.
Any card may fill an empty column.
Click the stock to turn one card; clicking the empty stock
recycles the waste for -100 points.
Drag cards to move them, right-click to send one home.

Waste to tableau +5, to foundation +10
Tableau to foundation +10, turning a card +5
Foundation to tableau -15, undo -15
Finishing earns 700000 / seconds played.

Press Enter to return.";

const RULES_DRAW_THREE: &str = "\
Klondike, draw three

Build the four foundations up by suit from Ace to King.
Tableau columns build down in alternating colours.
Only a King may fill an empty column.
Click the stock to turn three cards; the waste may be
recycled any number of times at no cost.
Drag cards to move them, right-click to send one home.

Waste to tableau +5, to foundation +10
Tableau to foundation +10, turning a card +5
Foundation to tableau -15, undo -15
Finishing earns 700000 / seconds played.

Press Enter to return.";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Face {
    Front(Suit, Rank),
    Back(usize),
    /// Outline of an empty pile.
    Slot,
    /// Shown where the stock was once it runs out.
    Reload
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub face: Face,
    pub rect: Rect
}

impl Game {
    /// Everything on the table in back to front order.
    pub fn sprites(&self) -> Vec<Sprite> {
        let table = &self.round.table;
        let layout = &table.layout;
        let mut sprites = Vec::with_capacity(80);

        for pile in PileId::all() {
            let face = if pile == PileId::Stock { Face::Reload } else { Face::Slot };
            sprites.push(Sprite { face, rect: layout.card_rect(layout.anchor(pile)) });
        }

        let held = self.round.held_cards();
        let face_of = |card: usize| {
            let card = table.card(card);
            if card.face_up { Face::Front(card.suit, card.rank) } else { Face::Back(self.card_back) }
        };
        let order = [PileId::Stock, PileId::Waste]
            .into_iter()
            .chain(PileId::tableau())
            .chain(PileId::foundations());
        for pile in order {
            for &card in table.pile(pile).cards.iter().filter(|card| !held.contains(*card)) {
                sprites.push(Sprite { face: face_of(card), rect: layout.card_rect(table.card(card).pos) });
            }
        }
        for &card in &held {
            sprites.push(Sprite { face: face_of(card), rect: layout.card_rect(table.card(card).pos) });
        }

        for mark in self.round.win.trail.iter() {
            let card = table.card(mark.card);
            sprites.push(Sprite { face: Face::Front(card.suit, card.rank), rect: layout.card_rect(mark.pos) });
        }
        if let Some(card) = self.round.win.moving {
            sprites.push(Sprite { face: face_of(card), rect: layout.card_rect(table.card(card).pos) });
        }
        sprites
    }

    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let screen = Screen::of(self.round.table.layout.frame_size);
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        for sprite in self.sprites() {
            screen.print_sprite(out, &sprite)?;
        }

        match self.state {
            State::ShowRules => {
                let rules = if self.draw_three { RULES_DRAW_THREE } else { RULES_DRAW_ONE };
                screen.print_panel(out, rules)?;
            }
            State::SelectCardBack => self.print_back_picker(out, &screen)?,
            State::Win => screen.print_panel(out, "Y O U   W I N !\n\nR: deal again")?,
            _ => {}
        }
        self.print_status(out, &screen)?;

        out.queue(style::ResetColor)?;
        out.flush()
    }

    fn print_status<W: Write>(&self, out: &mut W, screen: &Screen) -> io::Result<()> {
        let score = &self.round.score;
        let status = format!(
            " Score {}  Moves {}  Undos {}  Time {}s  Best {}  Draw {}  | R new  U undo  D mode  H rules  B back  Q quit",
            score.score,
            score.moves,
            score.undos,
            score.elapsed_seconds(),
            self.high_score.best,
            if self.draw_three { "3" } else { "1" }
        );
        out.queue(style::SetAttribute(style::Attribute::Reverse))?;
        screen.put(out, 0, screen.rows - 1, &format!("{:<width$}", status, width = screen.cols as usize))?;
        out.queue(style::SetAttribute(style::Attribute::Reset))?;
        Ok(())
    }

    fn print_back_picker<W: Write>(&self, out: &mut W, screen: &Screen) -> io::Result<()> {
        let mut text = String::from("Choose a card back\n\n");
        for (i, pattern) in BACK_PATTERNS.iter().enumerate() {
            let marker = if i == self.card_back { '>' } else { ' ' };
            text.push_str(&format!("{} {}  {}\n", marker, i, pattern.to_string().repeat(6)));
        }
        text.push_str("\nPress 0-5, then Enter.");
        screen.print_panel(out, &text)
    }
}

/// The terminal seen as a grid of cells over the pixel frame.
struct Screen {
    cols: i32,
    rows: i32
}

impl Screen {
    fn of(frame: Vec2) -> Screen {
        Screen {
            cols: (frame.x / CELL_WIDTH).round().max(1.0) as i32,
            rows: (frame.y / CELL_HEIGHT).round().max(2.0) as i32
        }
    }

    /// Writes `text` at a cell, dropping whatever falls off the board area.
    fn put<W: Write>(&self, out: &mut W, col: i32, row: i32, text: &str) -> io::Result<()> {
        if row < 0 || row >= self.rows {
            return Ok(());
        }
        let visible: String = text
            .chars()
            .enumerate()
            .filter(|&(i, _)| (0..self.cols).contains(&(col + i as i32)))
            .map(|(_, c)| c)
            .collect();
        if visible.is_empty() {
            return Ok(());
        }
        out.queue(cursor::MoveTo(col.max(0) as u16, row as u16))?;
        out.queue(Print(visible))?;
        Ok(())
    }

    fn print_sprite<W: Write>(&self, out: &mut W, sprite: &Sprite) -> io::Result<()> {
        let col = (sprite.rect.x / CELL_WIDTH).round() as i32;
        let row = (sprite.rect.y / CELL_HEIGHT).round() as i32;
        let width = ((sprite.rect.w / CELL_WIDTH).round() as i32).max(MIN_CARD_COLUMNS);
        let height = ((sprite.rect.h / CELL_HEIGHT).round() as i32).max(MIN_CARD_ROWS);
        let inner = (width - 2) as usize;

        let (label, fill, color) = match sprite.face {
            Face::Front(suit, rank) => {
                let color = if suit.is_red() { Color::Red } else { Color::White };
                (format!("{}{}", rank.label(), suit.symbol()), ' ', color)
            }
            Face::Back(back) => (String::new(), BACK_PATTERNS[back % CARD_BACKS], BACK_COLORS[back % CARD_BACKS]),
            Face::Slot | Face::Reload => (String::new(), ' ', Color::DarkGrey)
        };

        out.queue(style::SetForegroundColor(color))?;
        // `10♥` is three glyphs, so count chars rather than bytes
        let label_len = label.chars().count().min(inner);
        let top = format!("╭{}{}╮", label.chars().take(inner).collect::<String>(), "─".repeat(inner - label_len));
        self.put(out, col, row, &top)?;
        for dy in 1..height - 1 {
            let body = if sprite.face == Face::Reload && dy == height / 2 {
                let pad = inner.saturating_sub(1);
                format!("│{}↻{}│", " ".repeat(pad / 2), " ".repeat(pad - pad / 2))
            } else {
                format!("│{}│", fill.to_string().repeat(inner))
            };
            self.put(out, col, row + dy, &body)?;
        }
        self.put(out, col, row + height - 1, &format!("╰{}╯", "─".repeat(inner)))?;
        out.queue(style::ResetColor)?;
        Ok(())
    }

    /// Boxed text centred on the board.
    fn print_panel<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        let width = text.lines().map(|line| line.chars().count()).max().unwrap_or(0) as i32 + 4;
        let height = text.lines().count() as i32 + 2;
        let col = (self.cols - width) / 2;
        let row = (self.rows - 1 - height) / 2;
        let inner = (width - 2) as usize;

        self.put(out, col, row, &format!("╭{}╮", "─".repeat(inner)))?;
        for (i, line) in text.lines().enumerate() {
            self.put(out, col, row + 1 + i as i32, &format!("│ {:<width$} │", line, width = inner - 2))?;
        }
        self.put(out, col, row + height - 1, &format!("╰{}╯", "─".repeat(inner)))?;
        Ok(())
    }
}
