use std::error::Error;
use std::io::{stdout, Stdout};
use std::time::Instant;

use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand
};
use log::{error, info, LevelFilter};

mod cards;
mod config;
mod error;
mod game;
mod logger;
mod random;

use config::{Config, USAGE};
use game::input::{Key, MouseButton};
use game::layout::Vec2;
use game::{Game, CELL_HEIGHT, CELL_WIDTH};

enum Flow {
    Continue,
    Quit
}

fn key_for(event: KeyEvent) -> Option<Key> {
    let key = match event.code {
        KeyCode::Char('r') | KeyCode::Char('R') => Key::Reset,
        KeyCode::Char('u') | KeyCode::Char('U') | KeyCode::Char('z') | KeyCode::Char('Z') => Key::Undo,
        KeyCode::Char('d') | KeyCode::Char('D') => Key::ToggleDrawMode,
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => Key::ShowRules,
        KeyCode::Char('b') | KeyCode::Char('B') => Key::SelectCardBack,
        KeyCode::Enter | KeyCode::Esc => Key::Confirm,
        KeyCode::Char(c) => Key::Digit(c.to_digit(10)? as u8),
        _ => return None
    };
    Some(key)
}

fn cell_to_pixels(column: u16, row: u16) -> Vec2 {
    Vec2::new((column as f32 + 0.5) * CELL_WIDTH, (row as f32 + 0.5) * CELL_HEIGHT)
}

fn handle_event(game: &mut Game, event: Event) -> Flow {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            let quit = matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
                || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
            if quit {
                return Flow::Quit;
            }
            // Terminals do not report key releases, so every press is a full tap
            if let Some(key) = key_for(key) {
                game.on_key_down(key);
                game.on_key_up(key);
            }
        }
        Event::Mouse(MouseEvent { kind, column, row, .. }) => {
            let pos = cell_to_pixels(column, row);
            match kind {
                MouseEventKind::Down(event::MouseButton::Left) => game.on_mouse_down(MouseButton::Left, pos),
                MouseEventKind::Down(event::MouseButton::Right) => game.on_mouse_down(MouseButton::Right, pos),
                MouseEventKind::Up(event::MouseButton::Left) => game.on_mouse_up(MouseButton::Left, pos),
                MouseEventKind::Up(event::MouseButton::Right) => game.on_mouse_up(MouseButton::Right, pos),
                MouseEventKind::Moved | MouseEventKind::Drag(_) => game.on_mouse_move(pos),
                _ => {}
            }
        }
        Event::Resize(columns, rows) => {
            game.on_resize(columns as f32 * CELL_WIDTH, rows as f32 * CELL_HEIGHT);
        }
        _ => {}
    }
    Flow::Continue
}

fn run(config: Config, out: &mut Stdout) -> Result<(), Box<dyn Error>> {
    // Prepare terminal
    terminal::enable_raw_mode()?;
    out.execute(EnterAlternateScreen)?;
    out.execute(EnableMouseCapture)?;
    out.execute(cursor::Hide)?;
    out.execute(Clear(ClearType::All))?;

    let (columns, rows) = terminal::size()?;
    let frame_interval = config.frame_interval;
    let mut game = Game::new(config, columns as f32 * CELL_WIDTH, rows as f32 * CELL_HEIGHT);
    game.print(out)?;

    // Game loop
    let mut last_frame = Instant::now();
    'frames: loop {
        let deadline = last_frame + frame_interval;
        while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
            if !event::poll(timeout)? {
                break;
            }
            if let Flow::Quit = handle_event(&mut game, event::read()?) {
                break 'frames;
            }
        }

        let now = Instant::now();
        game.update(now.duration_since(last_frame).as_secs_f64());
        last_frame = now;
        game.print(out)?;
    }

    info!("quit with score {}", game.round().score.score);
    Ok(())
}

fn cleanup(out: &mut Stdout) {
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

fn main() {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if config.show_help {
        println!("{}", USAGE);
        return;
    }

    let level = if config.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = logger::init(&config.log_path, level) {
        eprintln!("logging to {} failed: {}", config.log_path.display(), e);
    }
    info!("starting with {:?}", config);

    let mut out = stdout();
    let result = run(config, &mut out);
    cleanup(&mut out);
    log::logger().flush();

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
