//! Registration state machine — tracks which field the user is providing.

use serde::{Deserialize, Serialize};

/// The states of the registration conversation.
///
/// Collects fields linearly: Name → Title → Department → Done. `Cancelled`
/// and `Error` are reachable from any collecting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Name,
    Title,
    Department,
    Done,
    Cancelled,
    Error,
}

impl RegistrationState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: RegistrationState) -> bool {
        use RegistrationState::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, target),
            (Name, Title) | (Title, Department) | (Department, Done)
        ) || matches!(target, Cancelled | Error)
    }

    /// Whether this state ends the conversation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Error)
    }

    /// The next collecting state in the linear progression, if any.
    pub fn next(&self) -> Option<RegistrationState> {
        use RegistrationState::*;
        match self {
            Name => Some(Title),
            Title => Some(Department),
            Department => Some(Done),
            Done | Cancelled | Error => None,
        }
    }
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Title => "title",
            Self::Department => "department",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use RegistrationState::*;
        let transitions = [(Name, Title), (Title, Department), (Department, Done)];
        for (from, to) in transitions {
            assert!(
                from.can_transition_to(to),
                "{from} should transition to {to}"
            );
        }
    }

    #[test]
    fn cancel_and_error_reachable_from_any_collecting_state() {
        use RegistrationState::*;
        for from in [Name, Title, Department] {
            assert!(from.can_transition_to(Cancelled));
            assert!(from.can_transition_to(Error));
        }
    }

    #[test]
    fn invalid_transitions() {
        use RegistrationState::*;
        // Skip a field
        assert!(!Name.can_transition_to(Department));
        assert!(!Name.can_transition_to(Done));
        // Go backward
        assert!(!Department.can_transition_to(Title));
        // Out of a terminal
        assert!(!Done.can_transition_to(Name));
        assert!(!Cancelled.can_transition_to(Error));
        // Self-transition
        assert!(!Title.can_transition_to(Title));
    }

    #[test]
    fn is_terminal() {
        use RegistrationState::*;
        assert!(Done.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(Error.is_terminal());
        assert!(!Name.is_terminal());
        assert!(!Title.is_terminal());
        assert!(!Department.is_terminal());
    }

    #[test]
    fn next_walks_the_happy_path() {
        use RegistrationState::*;
        let mut current = Name;
        for expected in [Title, Department, Done] {
            let next = current.next().unwrap();
            assert_eq!(next, expected);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn display_matches_serde() {
        use RegistrationState::*;
        for state in [Name, Title, Department, Done, Cancelled, Error] {
            let display = format!("{state}");
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }
}
