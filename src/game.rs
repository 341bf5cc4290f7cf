use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::cards::DECK_SIZE;
use crate::config::Config;
use crate::random::Pcg32;

use input::{Input, Key, MouseButton};
use layout::{Layout, Vec2};
use rules::{can_drag, drop_target, foundation_for, is_autocomplete_possible, is_won};
use score::{time_bonus, HighScore, Score, ScoreEvent, UNDO_PENALTY};
use table::{CardId, PileId, Table, TABLEAU_SIZE};
use undo::{UndoEntry, UndoLog};
use win::WinAnimation;

pub mod input;
pub mod layout;
mod print;
pub mod rules;
pub mod score;
pub mod table;
pub mod undo;
pub mod win;

pub use print::{Face, Sprite, CELL_HEIGHT, CELL_WIDTH};

pub const CARD_BACKS: usize = 6;

/// Pointer travel under which a press and release count as a click.
pub const MAX_DIST_CONSIDERED_CLICK: f32 = 2.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Dealing,
    Play,
    ShowRules,
    SelectCardBack,
    Autocomplete,
    Win
}

#[derive(Debug, Default, Clone, PartialEq)]
struct DealProgress {
    round: usize,
    pile: usize,
    countdown: f64
}

/// One deal: the table, its score and its history. Replaced wholesale on reset.
pub struct Round {
    pub seed: u64,
    pub table: Table,
    pub score: Score,
    pub undo: UndoLog,
    deal: DealProgress,
    autocomplete_countdown: f64,
    dragging: Option<CardId>,
    win: WinAnimation
}

impl Round {
    /// Shuffles the deck from `seed` into the stock, face down, ready to be dealt.
    pub fn new(seed: u64, layout: Layout, draw_three: bool) -> Round {
        let mut table = Table::new(layout, draw_three);
        let mut order: Vec<CardId> = (0..DECK_SIZE).collect();
        order.shuffle(&mut Pcg32::seed_from_u64(seed));
        for card in order {
            table.push(PileId::Stock, card);
            let target = table.card(card).target_pos;
            table.card_mut(card).pos = target;
        }
        Round::from_table(seed, table)
    }

    fn from_table(seed: u64, table: Table) -> Round {
        Round {
            seed,
            table,
            score: Score::default(),
            undo: UndoLog::default(),
            deal: DealProgress::default(),
            autocomplete_countdown: 0.0,
            dragging: None,
            win: WinAnimation::default()
        }
    }

    /// Deals the next card of the triangular layout: on round `r` every column
    /// from `r` on gets one card, face up only for column `r`.
    /// Returns false once all 28 cards are out.
    pub fn deal_step(&mut self) -> bool {
        if self.is_dealt() {
            return false;
        }
        let Some(card) = self.table.pop(PileId::Stock) else {
            return false;
        };
        let face_up = self.deal.pile == self.deal.round;
        self.table.set_face_up(card, face_up);
        self.table.push(PileId::Tableau(self.deal.pile), card);

        self.deal.pile += 1;
        if self.deal.pile == TABLEAU_SIZE {
            self.deal.round += 1;
            self.deal.pile = self.deal.round;
        }
        true
    }

    pub fn is_dealt(&self) -> bool {
        self.deal.round >= TABLEAU_SIZE
    }

    fn apply_score(&mut self, delta: i32) {
        let applied = self.score.apply(delta);
        if applied != 0 {
            self.undo.record(UndoEntry::Score(applied));
        }
    }

    /// Transfers `card` and the run above it onto `target`, recording it for undo.
    fn record_transfer(&mut self, card: CardId, target: PileId) -> PileId {
        let Some(source) = self.table.card(card).pile else {
            panic!("move of detached card {}", self.table.card(card));
        };
        let parent = self.table.card_below(card).map(|below| (below, self.table.card(below).face_up));
        self.undo.record(UndoEntry::Transfer {
            card,
            source,
            was_face_up: self.table.card(card).face_up,
            parent
        });
        self.table.transfer(target, card);
        source
    }

    /// A player move between piles, scored by where it came from and went to.
    pub fn move_cards(&mut self, card: CardId, target: PileId) {
        let source = self.record_transfer(card, target);
        debug!("moved {} from {:?} to {:?}", self.table.card(card), source, target);
        let event = match (source, target) {
            (PileId::Waste, PileId::Tableau(_)) => Some(ScoreEvent::WasteToTableau),
            (PileId::Waste, PileId::Foundation(_)) => Some(ScoreEvent::WasteToFoundation),
            (PileId::Tableau(_), PileId::Foundation(_)) => Some(ScoreEvent::TableauToFoundation),
            (PileId::Foundation(_), PileId::Tableau(_)) => Some(ScoreEvent::FoundationToTableau),
            _ => None
        };
        if let Some(event) = event {
            self.apply_score(event.delta());
        }
    }

    /// Turns one or three cards from the stock, or recycles the waste when the stock is empty.
    pub fn draw_from_stock(&mut self) {
        if self.table.is_empty(PileId::Stock) {
            self.recycle_waste();
            return;
        }
        let count = if self.table.draw_three { 3 } else { 1 };
        for _ in 0..count {
            let Some(card) = self.table.peek_top(PileId::Stock) else {
                break;
            };
            self.record_transfer(card, PileId::Waste);
            self.table.set_face_up(card, true);
        }
    }

    fn recycle_waste(&mut self) {
        if self.table.is_empty(PileId::Waste) {
            return;
        }
        let mut recycled = 0;
        while let Some(card) = self.table.peek_top(PileId::Waste) {
            self.record_transfer(card, PileId::Stock);
            self.table.set_face_up(card, false);
            recycled += 1;
        }
        self.table.retarget_pile(PileId::Stock);
        info!("recycled {} cards into the stock", recycled);
        if !self.table.draw_three {
            self.apply_score(ScoreEvent::RecycleWaste.delta());
        }
    }

    /// Flips face-down cards left on top of tableau columns.
    pub fn reveal_tableau(&mut self) {
        for pile in PileId::tableau() {
            if let Some(top) = self.table.peek_top(pile) {
                if !self.table.card(top).face_up {
                    self.table.set_face_up(top, true);
                    self.apply_score(ScoreEvent::TableauReveal.delta());
                }
            }
        }
    }

    /// Closes the current move. Returns true if anything happened during it.
    pub fn commit(&mut self) -> bool {
        if self.undo.commit() {
            self.score.moves += 1;
            true
        } else {
            false
        }
    }

    /// Reverts the last committed move and charges the undo penalty.
    pub fn undo(&mut self) -> bool {
        let Some(entries) = self.undo.pop_move() else {
            return false;
        };
        for entry in entries {
            match entry {
                UndoEntry::Transfer { card, source, was_face_up, parent } => {
                    if let Some((parent, parent_face_up)) = parent {
                        self.table.set_face_up(parent, parent_face_up);
                    }
                    self.table.transfer(source, card);
                    self.table.set_face_up(card, was_face_up);
                    self.table.retarget_pile(source);
                }
                UndoEntry::Score(delta) => {
                    self.score.apply(-delta);
                }
                UndoEntry::Commit => {}
            }
        }
        self.score.apply(UNDO_PENALTY);
        self.score.undos += 1;
        true
    }

    /// Right-click shortcut: moves a top card to the first foundation that takes it.
    pub fn send_to_foundation(&mut self, card: CardId) -> bool {
        match self.table.card(card).pile {
            Some(PileId::Waste) | Some(PileId::Tableau(_)) => {}
            _ => return false
        }
        match foundation_for(&self.table, card) {
            Some(foundation) => {
                self.move_cards(card, foundation);
                true
            }
            None => false
        }
    }

    /// Moves the first tableau top card that fits a foundation. False when none does.
    pub fn autocomplete_step(&mut self) -> bool {
        let next = PileId::tableau()
            .filter_map(|pile| self.table.peek_top(pile))
            .find_map(|card| foundation_for(&self.table, card).map(|foundation| (card, foundation)));
        match next {
            Some((card, foundation)) => {
                self.move_cards(card, foundation);
                true
            }
            None => false
        }
    }

    pub fn tableau_is_empty(&self) -> bool {
        PileId::tableau().all(|pile| self.table.is_empty(pile))
    }

    /// Topmost card under `pos`.
    pub fn card_at(&self, pos: Vec2) -> Option<CardId> {
        let order = PileId::foundations()
            .chain(PileId::tableau())
            .chain([PileId::Waste, PileId::Stock]);
        for pile in order {
            for &card in self.table.pile(pile).cards.iter().rev() {
                if self.table.layout.card_rect(self.table.card(card).pos).contains(pos) {
                    return Some(card);
                }
            }
        }
        None
    }

    fn held_cards(&self) -> Vec<CardId> {
        match self.dragging {
            Some(card) => self.table.run_from(card).to_vec(),
            None => Vec::new()
        }
    }

    pub fn begin_drag(&mut self, card: CardId, mouse: Vec2) -> bool {
        if !can_drag(&self.table, card) {
            return false;
        }
        for moving in self.table.run_from(card).to_vec() {
            let moving = self.table.card_mut(moving);
            moving.pos_before_drag = moving.pos;
            moving.drag_offset = moving.pos - mouse;
        }
        self.dragging = Some(card);
        true
    }

    pub fn drag_to(&mut self, mouse: Vec2) {
        for moving in self.held_cards() {
            let moving = self.table.card_mut(moving);
            moving.pos = mouse + moving.drag_offset;
        }
    }

    /// Drops the dragged run. Returns true if it landed on a new pile; otherwise
    /// the run goes back where it came from.
    pub fn end_drag(&mut self, mouse: Vec2, press: Vec2) -> bool {
        let Some(card) = self.dragging.take() else {
            return false;
        };
        if (mouse - press).length() <= MAX_DIST_CONSIDERED_CLICK {
            for moving in self.table.run_from(card).to_vec() {
                let moving = self.table.card_mut(moving);
                moving.pos = moving.pos_before_drag;
            }
            return false;
        }
        match drop_target(&self.table, card) {
            Some(target) => {
                self.move_cards(card, target);
                true
            }
            None => false
        }
    }

    pub fn cancel_drag(&mut self) {
        self.dragging = None;
    }

    /// Cards currently outside every pile.
    pub fn detached(&self) -> Vec<CardId> {
        self.win.detached()
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

pub struct Game {
    config: Config,
    rng: Pcg32,
    state: State,
    restore_state: State,
    round: Round,
    input: Input,
    high_score: HighScore,
    card_back: usize,
    draw_three: bool
}

impl Game {
    pub fn new(config: Config, width: f32, height: f32) -> Game {
        let seed = config.seed.unwrap_or_else(seed_from_clock);
        let draw_three = config.draw_three;
        let high_score = HighScore::load(&config.high_score_path);
        let mut game = Game {
            rng: Pcg32::new(seed),
            state: State::Dealing,
            restore_state: State::Dealing,
            round: Round::from_table(seed, Table::new(Layout::new(width, height), draw_three)),
            input: Input::default(),
            high_score,
            card_back: CARD_BACKS - 1,
            draw_three,
            config
        };
        game.start_round(seed);
        game
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn high_score(&self) -> i32 {
        self.high_score.best
    }

    fn set_state(&mut self, state: State) {
        if self.state != state {
            debug!("state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn start_round(&mut self, seed: u64) {
        let layout = self.round.table.layout.clone();
        info!("dealing seed {} in draw-{} mode", seed, if self.draw_three { "three" } else { "one" });
        self.round = Round::new(seed, layout, self.draw_three);
        self.round.deal.countdown = self.config.deal_delay;
        self.state = State::Dealing;
        self.restore_state = State::Dealing;
    }

    /// Discards the round, including any drag or animation in flight, and deals a new one.
    pub fn reset(&mut self) {
        let seed = self.rng.next_u64();
        self.start_round(seed);
    }

    // Host callbacks

    pub fn on_key_down(&mut self, key: Key) {
        self.input.key_down(key);
    }

    pub fn on_key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    pub fn on_mouse_down(&mut self, button: MouseButton, pos: Vec2) {
        self.input.mouse_down(button, pos);
    }

    pub fn on_mouse_up(&mut self, button: MouseButton, pos: Vec2) {
        self.input.mouse_up(button, pos);
    }

    pub fn on_mouse_move(&mut self, pos: Vec2) {
        self.input.mouse_move(pos);
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        info!("resized to {}x{}", width, height);
        self.round.table.resize(Layout::new(width, height));
    }

    /// Advances the game by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        self.handle_keys();
        match self.state {
            State::Dealing => self.update_dealing(dt),
            State::Play => self.update_play(dt),
            State::Autocomplete => self.update_autocomplete(dt),
            State::Win => self.update_win(dt),
            State::ShowRules | State::SelectCardBack => {
                self.animate(dt);
            }
        }
        self.input.end_frame();
    }

    fn handle_keys(&mut self) {
        for key in self.input.pressed_keys().to_vec() {
            match (self.state, key) {
                (_, Key::Reset) => self.reset(),
                (_, Key::ToggleDrawMode) => {
                    self.draw_three = !self.draw_three;
                    self.reset();
                }
                (State::ShowRules | State::SelectCardBack, Key::Confirm) => {
                    let back = self.restore_state;
                    self.set_state(back);
                }
                (State::Play, Key::ShowRules) => {
                    self.round.cancel_drag();
                    self.restore_state = self.state;
                    self.set_state(State::ShowRules);
                }
                (State::Play, Key::SelectCardBack) => {
                    self.round.cancel_drag();
                    self.restore_state = self.state;
                    self.set_state(State::SelectCardBack);
                }
                (_, Key::Digit(digit)) => {
                    if usize::from(digit) < CARD_BACKS {
                        self.card_back = usize::from(digit);
                    }
                }
                (State::Play, Key::Undo) => {
                    if self.round.dragging.is_none() {
                        self.round.commit();
                        if self.round.undo() {
                            info!("undo, score now {}", self.round.score.score);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn animate(&mut self, dt: f64) -> bool {
        let held = self.round.held_cards();
        self.round.table.step_towards_target(&held, self.config.card_animate_speed, dt as f32)
    }

    fn update_dealing(&mut self, dt: f64) {
        self.round.deal.countdown -= dt;
        while self.round.deal.countdown <= 0.0 && self.round.deal_step() {
            self.round.deal.countdown += self.config.deal_delay;
        }
        let moving = self.animate(dt);
        if self.round.is_dealt() && !moving {
            self.set_state(State::Play);
        }
    }

    fn update_play(&mut self, dt: f64) {
        self.round.score.elapsed += dt;
        let mouse = self.input.mouse_pos;

        if self.input.left.was_pressed() {
            self.handle_left_press(self.input.left_down_pos);
        }
        if self.round.dragging.is_some() && self.input.mouse_delta != Vec2::ZERO {
            self.round.drag_to(mouse);
        }
        if self.input.left.was_released() {
            self.round.end_drag(mouse, self.input.left_down_pos);
        }
        if self.input.right.was_released()
            && self.round.dragging.is_none()
            && (mouse - self.input.right_down_pos).length() <= MAX_DIST_CONSIDERED_CLICK
        {
            if let Some(card) = self.round.card_at(mouse) {
                self.round.send_to_foundation(card);
            }
        }

        self.animate(dt);
        self.finish_move();

        if is_won(&self.round.table) {
            self.finish_round();
        } else if is_autocomplete_possible(&self.round.table) {
            info!("autocompleting");
            self.round.autocomplete_countdown = self.config.autocomplete_delay;
            self.set_state(State::Autocomplete);
        }
    }

    fn handle_left_press(&mut self, pos: Vec2) {
        let layout = &self.round.table.layout;
        let on_stock = layout.card_rect(layout.anchor(PileId::Stock)).contains(pos)
            || self.round.card_at(pos).is_some_and(|card| self.round.table.card(card).pile == Some(PileId::Stock));
        if on_stock {
            self.round.draw_from_stock();
        } else if let Some(card) = self.round.card_at(pos) {
            self.round.begin_drag(card, pos);
        }
    }

    /// Reveals exposed tableau cards and closes the move if anything changed.
    fn finish_move(&mut self) {
        self.round.reveal_tableau();
        if self.round.commit() {
            debug!("move {} committed, score {}", self.round.score.moves, self.round.score.score);
        }
        self.high_score.observe(self.round.score.score);
        self.high_score.save_if_changed();
    }

    fn update_autocomplete(&mut self, dt: f64) {
        self.round.score.elapsed += dt;
        self.round.autocomplete_countdown -= dt;
        if self.round.autocomplete_countdown <= 0.0 {
            self.round.autocomplete_countdown += self.config.autocomplete_delay;
            self.round.autocomplete_step();
            self.finish_move();
        }
        self.animate(dt);
        if self.round.tableau_is_empty() {
            self.finish_round();
        }
    }

    /// Awards the time bonus and starts the win sequence.
    fn finish_round(&mut self) {
        let bonus = time_bonus(self.round.score.elapsed);
        self.round.score.apply(bonus);
        info!(
            "won seed {} in {}s with {} moves, score {} (bonus {})",
            self.round.seed,
            self.round.score.elapsed_seconds(),
            self.round.score.moves,
            self.round.score.score,
            bonus
        );
        self.high_score.observe(self.round.score.score);
        self.high_score.save_if_changed();
        self.set_state(State::Win);
    }

    fn update_win(&mut self, dt: f64) {
        let settling = self.animate(dt);
        if self.round.win.is_finished(&self.round.table) || (self.round.win.moving.is_none() && settling) {
            return;
        }
        self.round.win.update(&mut self.round.table, &mut self.rng, dt as f32);
    }
}
