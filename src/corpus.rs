use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::error::CorpusError;

static TEXTS_DIR: Dir = include_dir!("src/texts");

/// Name of the corpus used when none is given
pub const DEFAULT_CORPUS: &str = "prose";

/// A fixed set of passages a typing session draws its prompt from
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Corpus {
    pub name: String,
    texts: Vec<String>,
}

impl Corpus {
    pub fn new(name: impl Into<String>, texts: Vec<String>) -> Result<Self, CorpusError> {
        let corpus = Self {
            name: name.into(),
            texts,
        };
        corpus.validate()?;
        Ok(corpus)
    }

    /// A corpus holding just one text, for custom prompts
    pub fn single(text: impl Into<String>) -> Result<Self, CorpusError> {
        Self::new("custom", vec![text.into()])
    }

    /// Loads `<name>.json` from the bundled texts
    pub fn bundled(name: &str) -> Result<Self, CorpusError> {
        let file = TEXTS_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| CorpusError::Missing(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| CorpusError::Missing(name.to_string()))?;
        Self::from_json(contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let corpus: Corpus = serde_json::from_str(json).map_err(CorpusError::Parse)?;
        corpus.validate()?;
        Ok(corpus)
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Uniformly random text
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &str {
        // validate() guarantees at least one text
        self.texts.choose(rng).map(String::as_str).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), CorpusError> {
        if self.texts.is_empty() {
            return Err(CorpusError::Empty);
        }
        if let Some(idx) = self.texts.iter().position(|t| t.trim().is_empty()) {
            return Err(CorpusError::BlankText(idx));
        }
        Ok(())
    }
}
