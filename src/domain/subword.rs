//! Invertible subword encoding matching the vocabulary the summarization
//! model was trained with.
//!
//! Text is split into alternating runs of alphanumeric and non-alphanumeric
//! characters, each run is escaped so that `_` marks the end of a token, and
//! the escaped token is covered greedily by the longest known subtokens.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{AppError, AppResult};

pub const PAD_ID: i64 = 0;
pub const EOS_ID: i64 = 1;
pub const NUM_RESERVED_IDS: i64 = 2;

const ESCAPE_CHARS: &str = "\\_u;0123456789";
const REPLACEMENT_CHAR: char = '\u{3013}';

static UNESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\u|\\\\|\\([0-9]+);").expect("unescape pattern is valid")
});

/// Letters and numbers by general category; combining marks and symbols
/// such as circled letters fall outside.
static ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}]$").expect("alnum pattern is valid"));

#[derive(Debug, Clone)]
pub struct SubwordEncoder {
    subtokens: Vec<String>,
    ids: HashMap<String, i64>,
    alphabet: HashSet<char>,
    max_subtoken_len: usize,
}

impl SubwordEncoder {
    pub fn from_subtokens(subtokens: Vec<String>) -> Self {
        let ids = subtokens
            .iter()
            .enumerate()
            .filter(|(_, subtoken)| !subtoken.is_empty())
            .map(|(id, subtoken)| (subtoken.clone(), id as i64))
            .collect();
        let alphabet = subtokens
            .iter()
            .flat_map(|subtoken| subtoken.chars())
            .chain(ESCAPE_CHARS.chars())
            .collect();
        let max_subtoken_len = subtokens
            .iter()
            .map(|subtoken| subtoken.chars().count())
            .max()
            .unwrap_or(0);

        Self {
            subtokens,
            ids,
            alphabet,
            max_subtoken_len,
        }
    }

    /// Parses a vocabulary file: one subtoken per line, optionally quoted.
    pub fn parse_vocab(contents: &str) -> AppResult<Self> {
        let subtokens: Vec<String> = contents
            .lines()
            .map(|line| unquote(line.trim()).to_string())
            .collect();

        if subtokens.len() <= NUM_RESERVED_IDS as usize {
            return Err(AppError::Model(format!(
                "vocabulary has {} entries, expected reserved tokens followed by subtokens",
                subtokens.len()
            )));
        }

        Ok(Self::from_subtokens(subtokens))
    }

    pub fn vocab_size(&self) -> usize {
        self.subtokens.len()
    }

    pub fn encode(&self, text: &str) -> AppResult<Vec<i64>> {
        let mut ids = Vec::new();
        for token in tokenize(text) {
            let escaped: Vec<char> = escape_token(&token, &self.alphabet).chars().collect();
            self.push_subtoken_ids(&escaped, &mut ids)?;
        }
        Ok(ids)
    }

    pub fn decode(&self, ids: &[i64]) -> String {
        let concatenated: String = ids.iter().map(|id| self.subtoken(*id)).collect();
        let tokens: Vec<String> = concatenated
            .split('_')
            .filter(|piece| !piece.is_empty())
            .map(unescape_token)
            .filter(|token| !token.is_empty())
            .collect();
        detokenize(&tokens)
    }

    fn subtoken(&self, id: i64) -> &str {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.subtokens.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn push_subtoken_ids(&self, escaped: &[char], ids: &mut Vec<i64>) -> AppResult<()> {
        let mut start = 0;
        while start < escaped.len() {
            let upper = escaped.len().min(start + self.max_subtoken_len);
            let matched = (start + 1..=upper).rev().find_map(|end| {
                let candidate: String = escaped[start..end].iter().collect();
                self.ids.get(&candidate).map(|id| (end, *id))
            });

            match matched {
                Some((end, id)) => {
                    ids.push(id);
                    start = end;
                }
                None => {
                    let rest: String = escaped[start..].iter().collect();
                    return Err(AppError::Model(format!(
                        "no subtoken in vocabulary matches '{rest}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('\'') && value.ends_with('\''))
            || (value.starts_with('"') && value.ends_with('"')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn is_alnum(c: char) -> bool {
    ALNUM.is_match(c.encode_utf8(&mut [0; 4]))
}

fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    for pos in 1..chars.len() {
        if is_alnum(chars[pos]) != is_alnum(chars[pos - 1]) {
            let token: String = chars[start..pos].iter().collect();
            if token != " " || start == 0 {
                tokens.push(token);
            }
            start = pos;
        }
    }
    tokens.push(chars[start..].iter().collect());
    tokens
}

fn detokenize(tokens: &[String]) -> String {
    let mut text = String::new();
    let mut previous_alnum = false;
    for (index, token) in tokens.iter().enumerate() {
        let alnum = token.chars().next().is_some_and(is_alnum);
        if index > 0 && previous_alnum && alnum {
            text.push(' ');
        }
        text.push_str(token);
        previous_alnum = alnum;
    }
    text
}

fn escape_token(token: &str, alphabet: &HashSet<char>) -> String {
    let replaced = token.replace('\\', "\\\\").replace('_', "\\u");
    let mut escaped = String::with_capacity(replaced.len() + 1);
    for c in replaced.chars() {
        if alphabet.contains(&c) && c != '\n' {
            escaped.push(c);
        } else {
            let _ = write!(escaped, "\\{};", c as u32);
        }
    }
    escaped.push('_');
    escaped
}

fn unescape_token(escaped: &str) -> String {
    let trimmed = escaped.strip_suffix('_').unwrap_or(escaped);
    UNESCAPE
        .replace_all(trimmed, |caps: &Captures| match caps.get(1) {
            Some(code) => code
                .as_str()
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(REPLACEMENT_CHAR)
                .to_string(),
            None if &caps[0] == "\\u" => "_".to_string(),
            None => "\\".to_string(),
        })
        .into_owned()
}
