// Entity Models
//
// Plain values owned by the deck and the matchup tracker:
// - CardEntry: identity is the normalized name, everything else can change
// - MatchRecord: immutable once logged

pub mod card;
pub mod match_record;

pub use card::{normalize_name, CardEntry, ManaCost};
pub use match_record::{now_timestamp, MatchRecord, MatchResult, PLAYED_AT_FORMAT};
