//! Rejections reported back to the originating client.
//!
//! Every variant is recoverable: a rejected request never mutates the session
//! and is never broadcast to the room.

/// Result type for session operations
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("ゲームは開始されていません")]
    NotPlaying,

    #[error("プレイヤーが見つかりません")]
    PlayerNotFound,

    #[error("ルームが見つかりません")]
    RoomNotFound,

    #[error("カードの指定が正しくありません")]
    InvalidCardIndex,

    #[error("単語を入力してください")]
    EmptyWord,

    #[error("伸ばし棒は連続して使えません")]
    DoubleLongVowel,

    #[error("「{0}」から始まる単語ではありません")]
    WrongStart(char),

    #[error("「ん」で終わる単語は使えません")]
    EndsWithN,

    #[error("{0}文字以上の単語にしてください")]
    TooShort(usize),

    #[error("最後が「{0}」で終わる単語ではありません")]
    CharMismatch(String),

    #[error("最後が{0}で終わる単語ではありません")]
    RowMismatch(String),

    #[error("{0}ではない単語です")]
    LengthMismatch(String),

    #[error("この単語に使えるカードがありません")]
    NoMatchingCard,

    #[error("すでに上がっています")]
    AlreadyFinished,

    #[error("山札が空です")]
    DeckEmpty,

    #[error("山札不足（必要: {needed}枚, 残り: {available}枚）")]
    DeckShortage { needed: usize, available: usize },

    #[error("現在は判定中ではありません")]
    NoPendingChallenge,

    #[error("すでに投票済みです")]
    AlreadyVoted,

    #[error("自分の手には投票できません")]
    OwnMove,

    #[error("ホストのみがゲームを開始できます")]
    NotHost,

    #[error("ゲームはすでに進行中です")]
    GameInProgress,

    #[error("カードの優先順位が正しくありません")]
    InvalidPriority,
}

impl GameError {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotPlaying => "NOT_PLAYING",
            GameError::PlayerNotFound => "PLAYER_NOT_FOUND",
            GameError::RoomNotFound => "ROOM_NOT_FOUND",
            GameError::InvalidCardIndex => "INVALID_CARD_INDEX",
            GameError::EmptyWord => "EMPTY_WORD",
            GameError::DoubleLongVowel => "DOUBLE_LONG_VOWEL",
            GameError::WrongStart(_) => "WRONG_START_CHAR",
            GameError::EndsWithN => "ENDS_WITH_N",
            GameError::TooShort(_) => "TOO_SHORT",
            GameError::CharMismatch(_) => "CHAR_MISMATCH",
            GameError::RowMismatch(_) => "ROW_MISMATCH",
            GameError::LengthMismatch(_) => "LENGTH_MISMATCH",
            GameError::NoMatchingCard => "NO_MATCHING_CARD",
            GameError::AlreadyFinished => "ALREADY_FINISHED",
            GameError::DeckEmpty => "DECK_EMPTY",
            GameError::DeckShortage { .. } => "DECK_SHORTAGE",
            GameError::NoPendingChallenge => "NO_PENDING_CHALLENGE",
            GameError::AlreadyVoted => "ALREADY_VOTED",
            GameError::OwnMove => "OWN_MOVE",
            GameError::NotHost => "NOT_HOST",
            GameError::GameInProgress => "GAME_IN_PROGRESS",
            GameError::InvalidPriority => "INVALID_PRIORITY",
        }
    }
}
