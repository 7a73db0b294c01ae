//! Match status vocabulary and live-flag derivation.
//!
//! The provider describes a match with a short state word (`In Progress`,
//! `Stumps`, `Complete`, ...) and a free-text status line ("India won by 5
//! wkts"). The state word is looked up in [`STATE_TABLE`]; when it is missing
//! or unknown the status line is matched against [`STATUS_PHRASES`].

use serde::{Deserialize, Serialize};

/// Phase of a match, as far as liveness is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
    /// Scheduled, not started.
    Upcoming,
    /// Toss done, first ball not bowled.
    Toss,
    InProgress,
    /// Innings break, lunch, tea, drinks.
    Break,
    /// End of a day's play in a multi-day match.
    Stumps,
    /// Play held up by rain, light or outfield.
    Delayed,
    Complete,
    Abandoned,
    NoResult,
}

impl MatchPhase {
    /// The match has started and has not finished.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            MatchPhase::InProgress | MatchPhase::Break | MatchPhase::Stumps | MatchPhase::Delayed
        )
    }

    /// The match is over and can never be live again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchPhase::Complete | MatchPhase::Abandoned | MatchPhase::NoResult
        )
    }
}

/// Provider state words, compared case-insensitively after trimming.
pub const STATE_TABLE: &[(&str, MatchPhase)] = &[
    ("preview", MatchPhase::Upcoming),
    ("upcoming", MatchPhase::Upcoming),
    ("scheduled", MatchPhase::Upcoming),
    ("not started", MatchPhase::Upcoming),
    ("toss", MatchPhase::Toss),
    ("in progress", MatchPhase::InProgress),
    ("inprogress", MatchPhase::InProgress),
    ("live", MatchPhase::InProgress),
    ("innings break", MatchPhase::Break),
    ("lunch", MatchPhase::Break),
    ("tea", MatchPhase::Break),
    ("dinner", MatchPhase::Break),
    ("drinks", MatchPhase::Break),
    ("stumps", MatchPhase::Stumps),
    ("rain", MatchPhase::Delayed),
    ("delay", MatchPhase::Delayed),
    ("delayed", MatchPhase::Delayed),
    ("rain delay", MatchPhase::Delayed),
    ("complete", MatchPhase::Complete),
    ("completed", MatchPhase::Complete),
    ("result", MatchPhase::Complete),
    ("abandon", MatchPhase::Abandoned),
    ("abandoned", MatchPhase::Abandoned),
    ("cancelled", MatchPhase::Abandoned),
    ("no result", MatchPhase::NoResult),
];

/// Status-line phrases, checked in order; terminal phrases come first so that
/// "Match abandoned due to rain" is not read as a delay.
pub const STATUS_PHRASES: &[(&str, MatchPhase)] = &[
    ("abandoned", MatchPhase::Abandoned),
    ("called off", MatchPhase::Abandoned),
    ("cancelled", MatchPhase::Abandoned),
    ("no result", MatchPhase::NoResult),
    ("won by", MatchPhase::Complete),
    ("won the super over", MatchPhase::Complete),
    ("match tied", MatchPhase::Complete),
    ("match drawn", MatchPhase::Complete),
    ("stumps", MatchPhase::Stumps),
    ("innings break", MatchPhase::Break),
    ("lunch", MatchPhase::Break),
    ("tea break", MatchPhase::Break),
    ("drinks", MatchPhase::Break),
    ("rain", MatchPhase::Delayed),
    ("delayed", MatchPhase::Delayed),
    ("wet outfield", MatchPhase::Delayed),
    ("bad light", MatchPhase::Delayed),
    ("need", MatchPhase::InProgress),
    ("require", MatchPhase::InProgress),
    ("trail by", MatchPhase::InProgress),
    ("lead by", MatchPhase::InProgress),
    ("opt to bowl", MatchPhase::Toss),
    ("opt to bat", MatchPhase::Toss),
    ("elected to", MatchPhase::Toss),
    ("match starts at", MatchPhase::Upcoming),
    ("starts at", MatchPhase::Upcoming),
    ("yet to begin", MatchPhase::Upcoming),
];

/// Result of reading a match's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReading {
    /// `None` when neither the state word nor the status line was recognized.
    pub phase: Option<MatchPhase>,
    /// Diagnostic for unrecognized vocabulary.
    pub note: Option<String>,
}

/// Classify a state word and status line.
pub fn classify(state: &str, status: &str) -> StatusReading {
    let state_key = state.trim().to_lowercase();
    if let Some((_, phase)) = STATE_TABLE.iter().find(|(word, _)| *word == state_key) {
        return StatusReading {
            phase: Some(*phase),
            note: None,
        };
    }

    let status_key = status.trim().to_lowercase();
    if !status_key.is_empty()
        && let Some((_, phase)) = STATUS_PHRASES
            .iter()
            .find(|(phrase, _)| contains_phrase(&status_key, phrase))
    {
        return StatusReading {
            phase: Some(*phase),
            note: None,
        };
    }

    let note = if state_key.is_empty() && status_key.is_empty() {
        "no match status supplied".to_string()
    } else {
        format!(
            "unrecognized match status (state: {:?}, status: {:?})",
            state.trim(),
            status.trim()
        )
    };
    StatusReading {
        phase: None,
        note: Some(note),
    }
}

/// Phrase occurs at a word start, so "rain" does not match "Bahrain".
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(at, _)| {
        haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

/// Derive `isLive` from a status reading and the provider's own flag.
///
/// Terminal phases are never live. Otherwise an explicit provider flag wins,
/// then the phase. Unrecognized vocabulary may be terminal, so it is non-live
/// whatever the flag says.
pub fn derive_live(reading: &StatusReading, explicit: Option<bool>) -> bool {
    match reading.phase {
        Some(phase) if phase.is_terminal() => false,
        Some(phase) => explicit.unwrap_or(phase.is_live()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [MatchPhase; 9] = [
        MatchPhase::Upcoming,
        MatchPhase::Toss,
        MatchPhase::InProgress,
        MatchPhase::Break,
        MatchPhase::Stumps,
        MatchPhase::Delayed,
        MatchPhase::Complete,
        MatchPhase::Abandoned,
        MatchPhase::NoResult,
    ];

    #[test]
    fn test_live_and_terminal_are_disjoint() {
        for phase in ALL_PHASES {
            assert!(
                !(phase.is_live() && phase.is_terminal()),
                "{phase:?} is both live and terminal"
            );
        }
    }

    #[test]
    fn test_phase_liveness_table() {
        let expected = [
            (MatchPhase::Upcoming, false, false),
            (MatchPhase::Toss, false, false),
            (MatchPhase::InProgress, true, false),
            (MatchPhase::Break, true, false),
            (MatchPhase::Stumps, true, false),
            (MatchPhase::Delayed, true, false),
            (MatchPhase::Complete, false, true),
            (MatchPhase::Abandoned, false, true),
            (MatchPhase::NoResult, false, true),
        ];
        for (phase, live, terminal) in expected {
            assert_eq!(phase.is_live(), live, "{phase:?}");
            assert_eq!(phase.is_terminal(), terminal, "{phase:?}");
        }
    }

    #[test]
    fn test_every_state_word_classifies_to_its_phase() {
        for (word, phase) in STATE_TABLE {
            let reading = classify(word, "");
            assert_eq!(reading.phase, Some(*phase), "state word {word:?}");
            assert_eq!(reading.note, None);

            let shouted = classify(&format!("  {}  ", word.to_uppercase()), "");
            assert_eq!(shouted.phase, Some(*phase), "state word {word:?} uppercased");
        }
    }

    #[test]
    fn test_every_status_phrase_classifies_to_its_phase() {
        for (phrase, phase) in STATUS_PHRASES {
            let line = format!("Team A {phrase} something");
            assert_eq!(classify("", &line).phase, Some(*phase), "phrase {phrase:?}");
        }
    }

    #[test]
    fn test_state_word_takes_precedence_over_status_line() {
        let reading = classify("In Progress", "India opt to bowl");
        assert_eq!(reading.phase, Some(MatchPhase::InProgress));
    }

    #[test]
    fn test_terminal_phrases_win_over_delay_phrases() {
        assert_eq!(
            classify("", "Match abandoned due to rain").phase,
            Some(MatchPhase::Abandoned)
        );
        assert_eq!(
            classify("", "No result due to rain").phase,
            Some(MatchPhase::NoResult)
        );
    }

    #[test]
    fn test_common_provider_status_lines() {
        let cases = [
            ("India won by 5 wkts", MatchPhase::Complete),
            ("Australia opt to bowl", MatchPhase::Toss),
            ("Match starts at Jan 25, 04:00 GMT", MatchPhase::Upcoming),
            ("Day 2: Stumps - England lead by 112 runs", MatchPhase::Stumps),
            ("Pakistan need 45 runs in 30 balls", MatchPhase::InProgress),
            ("Match tied (South Africa won the Super Over)", MatchPhase::Complete),
            ("Match drawn", MatchPhase::Complete),
        ];
        for (line, phase) in cases {
            assert_eq!(classify("", line).phase, Some(phase), "{line}");
        }
    }

    #[test]
    fn test_phrases_only_match_at_word_start() {
        assert_eq!(
            classify("", "Bahrain need 20 runs").phase,
            Some(MatchPhase::InProgress)
        );
        assert_eq!(classify("", "Sri Lanka needs 3 runs").phase, Some(MatchPhase::InProgress));
    }

    #[test]
    fn test_unrecognized_vocabulary_is_non_live_with_note() {
        let reading = classify("Mystery", "Something odd happened");
        assert_eq!(reading.phase, None);
        let note = reading.note.as_deref().unwrap();
        assert!(note.contains("Mystery"));
        assert!(note.contains("Something odd happened"));
        assert!(!derive_live(&reading, None));
    }

    #[test]
    fn test_missing_status_gets_note() {
        let reading = classify("", "");
        assert_eq!(reading.phase, None);
        assert_eq!(reading.note.as_deref(), Some("no match status supplied"));
    }

    #[test]
    fn test_explicit_flag_never_overrides_terminal_status() {
        for phase in ALL_PHASES.into_iter().filter(|p| p.is_terminal()) {
            let reading = StatusReading {
                phase: Some(phase),
                note: None,
            };
            assert!(!derive_live(&reading, Some(true)), "{phase:?}");
        }
    }

    #[test]
    fn test_explicit_flag_honoured_for_non_terminal_status() {
        let upcoming = classify("Preview", "");
        assert!(!derive_live(&upcoming, None));
        assert!(derive_live(&upcoming, Some(true)));

        let in_progress = classify("In Progress", "");
        assert!(derive_live(&in_progress, None));
        assert!(!derive_live(&in_progress, Some(false)));

        let unknown = classify("Mystery", "");
        assert!(!derive_live(&unknown, Some(true)));
        assert!(!derive_live(&classify("", ""), Some(true)));
    }
}
