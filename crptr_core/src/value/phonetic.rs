//! Phonetic corruption driven by a table of conditional replacement rules.
//!
//! Each rule row carries seven columns:
//!
//! ```text
//! scope,pattern,replacement,precondition,postcondition,existcondition,startcondition
//! MIDDLE,gh,@,V,None,None,None
//! ALL,c,s,None,y;1;e;i;y,None,None
//! ALL,j,y,None,None,y;slavo,None
//! ```
//!
//! * scope: `ALL`, `START`, `MIDDLE` or `END`; where the pattern must sit.
//! * replacement: `@` stands for the empty string.
//! * pre/postcondition: `None`, `V` (vowel), `C` (consonant) on the
//!   neighbouring character, or context checks `flag;offset;pat[;pat...]`
//!   joined by `|`. A negative offset counts from the pattern start, any
//!   other offset from the pattern's last character. Flag `n` demands that no
//!   listed pattern occurs there, `y` that one does.
//! * existcondition: `None`, `y;slavo`/`n;slavo` (Slavo-Germanic looking
//!   value), or `y|n;pat[;pat...]` (pattern anywhere in the value).
//! * startcondition: `None` or `y|n;pat[;pat...]` (value starts with a pattern).
//!
//! Every rule is matched against the original value; the engine collects the
//! distinct alternatives all rules can produce and picks one uniformly.

use super::{ValueCorruptor, splice};
use crate::error::ConfigError;
use crate::lookup::LookupSource;
use rand::Rng;
use rand_core::RngCore;
use std::sync::Arc;
use tracing::debug;

const VOWELS: &str = "aeiouy";
const RULE_COLUMNS: usize = 7;
const NO_CONDITION: &str = "None";
const BLANK_REPLACEMENT: &str = "@";

/// Where in the value a rule's pattern has to occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Start,
    Middle,
    End,
}

impl Scope {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "ALL" => Ok(Scope::All),
            "START" => Ok(Scope::Start),
            "MIDDLE" => Ok(Scope::Middle),
            "END" => Ok(Scope::End),
            other => Err(format!("unknown scope '{other}'")),
        }
    }

    fn admits(self, start: usize, pattern_len: usize, value_len: usize) -> bool {
        match self {
            Scope::All => true,
            Scope::Start => start == 0,
            Scope::Middle => start > 0 && start + pattern_len < value_len,
            Scope::End => start + pattern_len == value_len,
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw {
        "y" => Ok(true),
        "n" => Ok(false),
        other => Err(format!("condition flag must be 'y' or 'n', found '{other}'")),
    }
}

fn parse_patterns<'a, I>(parts: I, condition: &str) -> Result<Vec<String>, String>
where
    I: Iterator<Item = &'a str>,
{
    let patterns: Vec<String> = parts.map(str::to_string).collect();
    if patterns.is_empty() || patterns.iter().any(String::is_empty) {
        return Err(format!("condition '{condition}' lists no usable pattern"));
    }
    Ok(patterns)
}

/// Presence or absence of patterns at an offset relative to the matched pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextCheck {
    pub present: bool,
    pub offset: i64,
    pub patterns: Vec<String>,
}

impl ContextCheck {
    fn parse(raw: &str) -> Result<Self, String> {
        let mut parts = raw.split(';');
        let present = parse_flag(parts.next().unwrap_or_default())?;
        let offset = parts
            .next()
            .ok_or_else(|| format!("context condition '{raw}' has no offset"))?
            .parse::<i64>()
            .map_err(|e| format!("context condition '{raw}' has a bad offset: {e}"))?;
        let patterns = parse_patterns(parts, raw)?;
        Ok(Self {
            present,
            offset,
            patterns,
        })
    }

    fn holds(&self, value: &[char], start: usize, pattern_len: usize) -> bool {
        let index = if self.offset < 0 {
            start as i64 + self.offset
        } else {
            (start + pattern_len - 1) as i64 + self.offset
        };
        let found = index >= 0
            && self
                .patterns
                .iter()
                .any(|p| occurs_at(value, index as usize, p));
        found == self.present
    }
}

/// Condition on the characters before (precondition) or after (postcondition)
/// the matched pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighbourCondition {
    None,
    Vowel,
    Consonant,
    /// All checks must hold.
    Context(Vec<ContextCheck>),
}

impl NeighbourCondition {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            NO_CONDITION => Ok(NeighbourCondition::None),
            "V" => Ok(NeighbourCondition::Vowel),
            "C" => Ok(NeighbourCondition::Consonant),
            other if other.contains(';') => Ok(NeighbourCondition::Context(
                other
                    .split('|')
                    .map(ContextCheck::parse)
                    .collect::<Result<_, _>>()?,
            )),
            other => Err(format!("unknown neighbour condition '{other}'")),
        }
    }

    /// `neighbour` is the character directly next to the pattern, if the
    /// pattern does not touch that end of the value.
    fn holds(&self, neighbour: Option<char>, value: &[char], start: usize, pattern_len: usize) -> bool {
        let Some(neighbour) = neighbour else {
            return matches!(self, NeighbourCondition::None);
        };
        match self {
            NeighbourCondition::None => true,
            NeighbourCondition::Vowel => VOWELS.contains(neighbour),
            NeighbourCondition::Consonant => !VOWELS.contains(neighbour),
            NeighbourCondition::Context(checks) => {
                checks.iter().all(|c| c.holds(value, start, pattern_len))
            }
        }
    }
}

/// Condition on the whole original value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistCondition {
    None,
    SlavoGermanic { present: bool },
    Substring { present: bool, patterns: Vec<String> },
}

impl ExistCondition {
    fn parse(raw: &str) -> Result<Self, String> {
        if raw == NO_CONDITION {
            return Ok(ExistCondition::None);
        }
        let mut parts = raw.split(';');
        let present = parse_flag(parts.next().unwrap_or_default())?;
        let rest: Vec<&str> = parts.collect();
        if rest == ["slavo"] {
            return Ok(ExistCondition::SlavoGermanic { present });
        }
        Ok(ExistCondition::Substring {
            present,
            patterns: parse_patterns(rest.into_iter(), raw)?,
        })
    }

    fn holds(&self, original: &str) -> bool {
        match self {
            ExistCondition::None => true,
            ExistCondition::SlavoGermanic { present } => is_slavo_germanic(original) == *present,
            ExistCondition::Substring { present, patterns } => {
                patterns.iter().any(|p| original.contains(p.as_str())) == *present
            }
        }
    }
}

/// Condition on how the original value begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartCondition {
    None,
    Prefix { present: bool, patterns: Vec<String> },
}

impl StartCondition {
    fn parse(raw: &str) -> Result<Self, String> {
        if raw == NO_CONDITION {
            return Ok(StartCondition::None);
        }
        let mut parts = raw.split(';');
        let present = parse_flag(parts.next().unwrap_or_default())?;
        Ok(StartCondition::Prefix {
            present,
            patterns: parse_patterns(parts, raw)?,
        })
    }

    fn holds(&self, original: &str) -> bool {
        match self {
            StartCondition::None => true,
            StartCondition::Prefix { present, patterns } => {
                patterns.iter().any(|p| original.starts_with(p.as_str())) == *present
            }
        }
    }
}

fn is_slavo_germanic(value: &str) -> bool {
    ["w", "k", "cz", "witz"].iter().any(|p| value.contains(p))
}

fn occurs_at(value: &[char], index: usize, pattern: &str) -> bool {
    let mut pattern_chars = pattern.chars();
    let mut idx = index;
    loop {
        match pattern_chars.next() {
            None => return true,
            Some(c) if value.get(idx) == Some(&c) => idx += 1,
            Some(_) => return false,
        }
    }
}

fn find_from(value: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > value.len() {
        return None;
    }
    (from..=value.len() - pattern.len()).find(|&i| value[i..i + pattern.len()] == *pattern)
}

/// One conditional replacement rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneticRule {
    pub scope: Scope,
    pub pattern: String,
    pub replacement: String,
    pub precondition: NeighbourCondition,
    pub postcondition: NeighbourCondition,
    pub exist_condition: ExistCondition,
    pub start_condition: StartCondition,
    pattern_chars: Vec<char>,
}

impl PhoneticRule {
    /// Parses the seven columns of a rule row.
    pub fn parse(columns: &[&str]) -> Result<Self, String> {
        if columns.len() != RULE_COLUMNS {
            return Err(format!(
                "expected {} columns, found {}",
                RULE_COLUMNS,
                columns.len()
            ));
        }
        let pattern = columns[1].to_string();
        if pattern.is_empty() {
            return Err("pattern must not be empty".to_string());
        }
        let replacement = match columns[2] {
            BLANK_REPLACEMENT => String::new(),
            other => other.to_string(),
        };
        Ok(Self {
            scope: Scope::parse(columns[0])?,
            pattern_chars: pattern.chars().collect(),
            pattern,
            replacement,
            precondition: NeighbourCondition::parse(columns[3])?,
            postcondition: NeighbourCondition::parse(columns[4])?,
            exist_condition: ExistCondition::parse(columns[5])?,
            start_condition: StartCondition::parse(columns[6])?,
        })
    }

    fn applies_at(&self, value: &[char], original: &str, start: usize) -> bool {
        let len = self.pattern_chars.len();
        let before = start.checked_sub(1).map(|i| value[i]);
        let after = value.get(start + len).copied();
        self.scope.admits(start, len, value.len())
            && self.precondition.holds(before, value, start, len)
            && self.postcondition.holds(after, value, start, len)
            && self.exist_condition.holds(original)
            && self.start_condition.holds(original)
    }

    /// Start of the first occurrence that satisfies scope and all conditions.
    ///
    /// After a rejected occurrence the scan resumes one character later; it
    /// ends once the resume point reaches the final character.
    pub fn first_match(&self, value: &[char], original: &str) -> Option<usize> {
        let mut from = 0;
        loop {
            let start = find_from(value, &self.pattern_chars, from)?;
            if self.applies_at(value, original, start) {
                return Some(start);
            }
            from = start + 1;
            if from + 1 >= value.len() {
                return None;
            }
        }
    }

    /// The value with this rule applied, if the rule applies at all.
    pub fn apply(&self, original: &str) -> Option<String> {
        let chars: Vec<char> = original.chars().collect();
        let start = self.first_match(&chars, original)?;
        Some(splice(
            &chars,
            start,
            start + self.pattern_chars.len(),
            &self.replacement,
        ))
    }
}

/// An ordered phonetic rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneticRules {
    rules: Vec<PhoneticRule>,
}

impl PhoneticRules {
    pub fn load(source: &LookupSource) -> Result<Self, ConfigError> {
        let rows = source.read_rows(RULE_COLUMNS)?;
        let mut rules = Vec::with_capacity(rows.len());
        for (line, row) in &rows {
            let columns: Vec<&str> = row.iter().map(String::as_str).collect();
            let rule = PhoneticRule::parse(&columns).map_err(|reason| source.malformed(*line, reason))?;
            rules.push(rule);
        }
        debug!(path = ?source.path, rules = rules.len(), "Loaded phonetic rules");
        Ok(Self { rules })
    }

    pub fn from_rules(rules: Vec<PhoneticRule>) -> Self {
        Self { rules }
    }

    /// Distinct alternatives the rule table can produce for `original`, in rule order.
    pub fn alternatives(&self, original: &str) -> Vec<String> {
        let mut alternatives: Vec<String> = Vec::new();
        for rule in &self.rules {
            if let Some(alternative) = rule.apply(original) {
                if alternative != original && !alternatives.contains(&alternative) {
                    alternatives.push(alternative);
                }
            }
        }
        alternatives
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Replaces a sound-alike character sequence (`ph` for `f`, a silent `gh`, ...).
#[derive(Debug, Clone)]
pub struct PhoneticCorruptor {
    rules: Arc<PhoneticRules>,
}

impl PhoneticCorruptor {
    pub fn new(source: &LookupSource) -> Result<Self, ConfigError> {
        Ok(Self::with_rules(Arc::new(PhoneticRules::load(source)?)))
    }

    pub fn with_rules(rules: Arc<PhoneticRules>) -> Self {
        Self { rules }
    }
}

impl ValueCorruptor for PhoneticCorruptor {
    fn name(&self) -> &str {
        "Phonetic value"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        if value.is_empty() {
            return value.to_string();
        }
        let mut alternatives = self.rules.alternatives(value);
        if alternatives.is_empty() {
            return value.to_string();
        }
        let pick = rng.random_range(0..alternatives.len());
        alternatives.swap_remove(pick)
    }
}
