use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolitaireError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("high score file holds {len} bytes, expected 4")]
    InvalidHighScore { len: usize },

    #[error("{0}")]
    Config(String)
}
