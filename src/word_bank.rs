use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::error::Error;

static LANG_DIR: Dir = include_dir!("src/lang");

/// Default number of words generated for a session
pub const DEFAULT_WORD_COUNT: usize = 50;

#[derive(Deserialize, Clone, Debug)]
pub struct WordBank {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordBank {
    /// The embedded list of ~100 common English words
    pub fn common() -> Self {
        read_bank_from_file("common.json").unwrap_or_else(|_| Self::fallback())
    }

    pub fn from_words<I, S>(name: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        Self {
            name: name.to_string(),
            size: words.len() as u32,
            words,
        }
    }

    fn fallback() -> Self {
        Self::from_words("fallback", ["the", "and", "is", "it", "to"])
    }

    /// Sample `count` words uniformly, with replacement
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> WordSequence {
        let words = (0..count)
            .filter_map(|_| self.words.choose(rng).cloned())
            .collect();
        WordSequence { words }
    }
}

fn read_bank_from_file(file_name: &str) -> Result<WordBank, Box<dyn Error>> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("word bank {file_name} not embedded"))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or("word bank is not valid utf-8")?;

    let bank: WordBank = serde_json::from_str(file_as_str)?;
    if bank.words.is_empty() {
        return Err("word bank is empty".into());
    }

    Ok(bank)
}

/// Words the user has to type in one session. Fixed once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSequence {
    words: Vec<String>,
}

impl WordSequence {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// Produces the word sequence for each new session
pub trait WordSource {
    fn generate(&mut self, count: usize) -> WordSequence;
}

/// Uniform sampling from a word bank with the thread RNG
pub struct RandomWords {
    bank: WordBank,
}

impl RandomWords {
    pub fn new(bank: WordBank) -> Self {
        Self { bank }
    }
}

impl Default for RandomWords {
    fn default() -> Self {
        Self::new(WordBank::common())
    }
}

impl WordSource for RandomWords {
    fn generate(&mut self, count: usize) -> WordSequence {
        self.bank.sample(count, &mut rand::thread_rng())
    }
}

/// Always hands out the same words; used for scripted sessions and tests
#[derive(Debug, Clone)]
pub struct FixedWords(pub WordSequence);

impl WordSource for FixedWords {
    fn generate(&mut self, _count: usize) -> WordSequence {
        self.0.clone()
    }
}
