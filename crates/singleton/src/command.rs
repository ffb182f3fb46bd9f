//! Command protocol executed on receiving members
//!
//! Commands are side-effect-free to construct and side-effectful to execute.
//! Wire bytes are the concern of the marshalling collaborator; this module
//! only fixes the shapes.

use serde::{Deserialize, Serialize};

use soloist_membership::Member;

use crate::election::ElectionOutcome;

/// Commands dispatched between members of a singleton service group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SingletonCommand {
    /// Start the singleton service on the receiving member.
    Start,

    /// Stop the singleton service on the receiving member.
    Stop,

    /// Ask the receiving member whether it is currently primary.
    QueryIsPrimary,

    /// Deliver an election outcome to the receiving member's listeners.
    ElectionNotify {
        /// The candidates of the election, in membership order.
        candidates: Vec<Member>,

        /// Index of the elected member within `candidates`, or `None` when
        /// no member was elected. Encoded as an index rather than repeating
        /// the member payload to keep the wire representation small.
        elected: Option<usize>,
    },
}

impl SingletonCommand {
    /// Build an `ElectionNotify` command from an election outcome.
    #[must_use]
    pub fn notify(outcome: &ElectionOutcome) -> Self {
        let elected = outcome
            .elected
            .as_ref()
            .and_then(|winner| outcome.candidates.iter().position(|c| c == winner));

        Self::ElectionNotify {
            candidates: outcome.candidates.clone(),
            elected,
        }
    }
}

/// Responses produced by executing a [`SingletonCommand`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandResponse {
    /// The command executed; it carries no value.
    Ack,

    /// Answer to [`SingletonCommand::QueryIsPrimary`].
    Primary(bool),
}
