//! Run options

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SolitaireError;

pub const USAGE: &str = "\
usage: rusty_klondike [options]

  --draw-three         turn three cards from the stock at a time
  --seed <n>           deal from a fixed seed
  --high-score <path>  high score file (default highscore.dat)
  --log <path>         log file (default solitaire.log)
  --verbose            debug logging
  --help               show this text";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub draw_three: bool,
    pub seed: Option<u64>,
    pub high_score_path: PathBuf,
    pub log_path: PathBuf,
    pub verbose: bool,
    pub show_help: bool,

    /// Seconds between two cards during the deal.
    pub deal_delay: f64,
    /// Seconds between two automatic foundation moves.
    pub autocomplete_delay: f64,
    /// Fraction of the remaining distance a card covers per second.
    pub card_animate_speed: f32,
    pub frame_interval: Duration
}

impl Default for Config {
    fn default() -> Self {
        Config {
            draw_three: false,
            seed: None,
            high_score_path: PathBuf::from("highscore.dat"),
            log_path: PathBuf::from("solitaire.log"),
            verbose: false,
            show_help: false,
            deal_delay: 0.05,
            autocomplete_delay: 0.1,
            card_animate_speed: 15.0,
            frame_interval: Duration::from_millis(16)
        }
    }
}

impl Config {
    /// Parses command line arguments, not including the program name.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Config, SolitaireError> {
        let mut config = Config::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--draw-three" => config.draw_three = true,
                "--verbose" => config.verbose = true,
                "--help" | "-h" => config.show_help = true,
                "--seed" => {
                    let value = Self::value_for(&arg, args.next())?;
                    let seed = value
                        .parse()
                        .map_err(|_| SolitaireError::Config(format!("--seed expects a number, got {:?}", value)))?;
                    config.seed = Some(seed);
                }
                "--high-score" => config.high_score_path = Self::value_for(&arg, args.next())?.into(),
                "--log" => config.log_path = Self::value_for(&arg, args.next())?.into(),
                other => return Err(SolitaireError::Config(format!("unknown option {:?}\n\n{}", other, USAGE)))
            }
        }
        Ok(config)
    }

    fn value_for(flag: &str, value: Option<String>) -> Result<String, SolitaireError> {
        value.ok_or_else(|| SolitaireError::Config(format!("{} needs a value", flag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, SolitaireError> {
        Config::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.draw_three);
        assert_eq!(config.high_score_path, PathBuf::from("highscore.dat"));
    }

    #[test]
    fn flags() {
        let config = parse(&["--draw-three", "--seed", "42", "--high-score", "/tmp/hs.dat", "--verbose"]).unwrap();
        assert!(config.draw_three && config.verbose);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.high_score_path, PathBuf::from("/tmp/hs.dat"));
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(parse(&["--seed", "abc"]), Err(SolitaireError::Config(_))));
        assert!(matches!(parse(&["--seed"]), Err(SolitaireError::Config(_))));
        assert!(matches!(parse(&["--fast"]), Err(SolitaireError::Config(_))));
    }
}
