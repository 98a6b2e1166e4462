use crate::error::EngineError;
use crate::params::MutationState;
use crate::pitch::{self, Key};

/// Longest sequence the scheduler will accept.
pub const MAX_LEN: usize = 32;

/// One symbol of the four-letter alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    /// Parse a single character, case-insensitively.
    ///
    /// An out-of-alphabet character is an input-contract violation: callers
    /// are expected to run text through [`Sequence::sanitize`] first.
    pub fn from_char(c: char) -> Result<Self, EngineError> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Base::A),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            'T' => Ok(Base::T),
            other => Err(EngineError::InvalidSymbol(other)),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
        }
    }

    /// Stable index into per-symbol tables (frequency table, renderer colors).
    pub fn index(self) -> usize {
        match self {
            Base::A => 0,
            Base::C => 1,
            Base::G => 2,
            Base::T => 3,
        }
    }
}

/// An ordered, validated run of symbols, at most [`MAX_LEN`] long.
///
/// Insertion order is significant; the scheduler walks it front to back and
/// wraps around. Only symbols that survived [`Sequence::sanitize`] (or were
/// parsed through [`Base::from_char`]) can exist in here, so the scheduler
/// never sees an out-of-alphabet symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    bases: Vec<Base>,
}

impl Sequence {
    /// Build from already-validated symbols, truncating at [`MAX_LEN`].
    pub fn new(mut bases: Vec<Base>) -> Self {
        bases.truncate(MAX_LEN);
        Self { bases }
    }

    /// The upstream sanitizer: keeps valid symbols (case-insensitive), drops
    /// everything else, and truncates at [`MAX_LEN`].
    pub fn sanitize(text: &str) -> Self {
        let bases = text
            .chars()
            .filter_map(|c| Base::from_char(c).ok())
            .take(MAX_LEN)
            .collect();
        Self { bases }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Base> {
        self.bases.get(index).copied()
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Derived per-symbol frequency list for the current key and mutation,
    /// used by renderers and labeling.
    pub fn frequencies(&self, key: Key, mutation: &MutationState, detune_scale: f32) -> Vec<f32> {
        self.bases
            .iter()
            .map(|&b| pitch::frequency(b, key, mutation, detune_scale))
            .collect()
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for base in &self.bases {
            write!(f, "{}", base.as_char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_only_alphabet() {
        let seq = Sequence::sanitize("AxC-g t!T");
        assert_eq!(seq.to_string(), "ACGTT");
    }

    #[test]
    fn sanitize_is_case_insensitive() {
        let seq = Sequence::sanitize("acgt");
        assert_eq!(seq.bases(), &[Base::A, Base::C, Base::G, Base::T]);
    }

    #[test]
    fn sanitize_truncates_at_max_len() {
        let text = "A".repeat(100);
        let seq = Sequence::sanitize(&text);
        assert_eq!(seq.len(), MAX_LEN);
    }

    #[test]
    fn sanitize_of_garbage_is_empty() {
        assert!(Sequence::sanitize("xyz 123").is_empty());
    }

    #[test]
    fn from_char_rejects_unknown_symbols() {
        assert_eq!(
            Base::from_char('z'),
            Err(EngineError::InvalidSymbol('Z'))
        );
    }

    #[test]
    fn frequency_list_matches_sequence_order() {
        let seq = Sequence::sanitize("TA");
        let freqs = seq.frequencies(Key::Natural, &MutationState::default(), 1.0);
        assert_eq!(freqs.len(), 2);
        assert!(freqs[0] > freqs[1], "T is pitched above A in the base table");
    }
}
