//! Word list loaded at startup. Only its size is reported to clients; it does
//! not decide whether a word is legal.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dictionary: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A word list entry: a bare reading, or a record carrying one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Reading(String),
    Record {
        kana: Option<String>,
        reading: Option<String>,
    },
}

impl Entry {
    fn into_reading(self) -> Option<String> {
        let reading = match self {
            Entry::Reading(r) => Some(r),
            Entry::Record { kana, reading } => kana.or(reading),
        }?;
        let reading = reading.trim().to_string();
        (!reading.is_empty()).then_some(reading)
    }
}

const BUILTIN_WORDS: &[&str] = &[
    "りんご", "ゴリラ", "ラッパ", "パンツ", "キツネ", "ネコ", "コマ", "マント", "トマト",
    "トランプ", "プリン", "リボン", "スイカ", "カラス", "スズメ", "メダカ", "カメラ", "ラクダ",
    "ダチョウ", "ウシ", "シマウマ", "マクラ", "ラッコ", "コアラ", "ライオン", "ロバ", "バイク",
    "クルマ", "マイク", "クスリ", "リス", "スイミング", "グミ", "ミカン", "ナシ", "シカ", "カバ",
    "バナナ", "ナマケモノ", "ノリ", "リクガメ", "メロン", "ルビー", "ビール", "イヌ", "ヌマ",
    "マリモ", "モチ", "チクワ", "ワニ", "ニワトリ", "トリ", "クライミング", "グライダー",
    "ダンプカー", "カーテン", "テント", "トンネル", "ルンバ", "バスケット", "トースト",
    "ステーキ", "キリン", "スイス", "スタンプ", "プラモデル", "ビーズ", "ズボン", "アイロン",
    "ロケット", "トケイ", "イカ", "カニ", "ニジ", "ジドウシャ", "ヤカン",
];

#[derive(Debug, Clone)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Load a JSON word list, falling back to the built-in words on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(dictionary) => {
                tracing::info!(
                    "Loaded {} dictionary entries from {}",
                    dictionary.len(),
                    path.display()
                );
                dictionary
            }
            Err(e) => {
                tracing::warn!(
                    "Using built-in dictionary ({}): {}",
                    path.display(),
                    e
                );
                Self::builtin()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, DictionaryError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, DictionaryError> {
        let entries: Vec<Entry> = serde_json::from_str(raw)?;
        let words = entries
            .into_iter()
            .filter_map(Entry::into_reading)
            .collect();
        Ok(Self { words })
    }

    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::builtin()
    }
}
