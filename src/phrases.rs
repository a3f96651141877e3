use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::SessionError;

static PACK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/packs");

/// Which pool a phrase is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PhraseKind {
    Normal,
    Boss,
}

#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
pub struct PhrasePack {
    pub name: String,
    pub size: u32,
    pub phrases: Vec<String>,
}

impl PhrasePack {
    fn embedded(name: &str) -> Result<Self, SessionError> {
        let file = PACK_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| SessionError::MissingPhrasePack(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| SessionError::MissingPhrasePack(name.to_string()))?;

        serde_json::from_str(contents).map_err(|source| SessionError::InvalidPhrasePack {
            name: name.to_string(),
            source,
        })
    }
}

/// Plain and boss-flavoured phrases a session can draw from.
#[derive(Debug, Clone, PartialEq)]
pub struct PhrasePool {
    normal: Vec<String>,
    boss: Vec<String>,
}

impl PhrasePool {
    pub fn new(normal: Vec<String>, boss: Vec<String>) -> Self {
        Self { normal, boss }
    }

    /// The packs compiled into the binary.
    pub fn builtin() -> Result<Self, SessionError> {
        let normal = PhrasePack::embedded("normal")?;
        let boss = PhrasePack::embedded("boss")?;
        Ok(Self::new(normal.phrases, boss.phrases))
    }

    /// A pool that always serves `prompt`, whatever the kind.
    pub fn single(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self::new(vec![prompt.clone()], vec![prompt])
    }

    /// Reads a pack file shaped like `{"normal": [...], "boss": [...]}`.
    /// A missing `boss` list falls back to the built-in boss phrases.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        #[derive(Deserialize)]
        struct PoolFile {
            normal: Vec<String>,
            #[serde(default)]
            boss: Option<Vec<String>>,
        }

        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| SessionError::PhraseFile {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: PoolFile =
            serde_json::from_str(&data).map_err(|source| SessionError::InvalidPhrasePack {
                name: path.display().to_string(),
                source,
            })?;

        let boss = match parsed.boss {
            Some(boss) => boss,
            None => PhrasePack::embedded("boss")?.phrases,
        };
        Ok(Self::new(parsed.normal, boss))
    }

    pub fn phrases(&self, kind: PhraseKind) -> &[String] {
        match kind {
            PhraseKind::Normal => &self.normal,
            PhraseKind::Boss => &self.boss,
        }
    }

    /// Fails if the pool of `kind` has no usable phrase.
    pub fn ensure_usable(&self, kind: PhraseKind) -> Result<(), SessionError> {
        if self.phrases(kind).iter().any(|p| !p.is_empty()) {
            Ok(())
        } else {
            Err(SessionError::EmptyPool(kind))
        }
    }

    /// Picks a random non-empty phrase of `kind`.
    pub fn pick<R: Rng + ?Sized>(&self, kind: PhraseKind, rng: &mut R) -> Option<&str> {
        let usable: Vec<&String> = self.phrases(kind).iter().filter(|p| !p.is_empty()).collect();
        usable.choose(rng).copied().map(String::as_str)
    }
}
