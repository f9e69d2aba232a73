pub mod consensus;
pub mod event;

pub use consensus::evaluator::{
    ConsensusDecision, ConsensusEvaluator, ConsensusResult, ACCEPTANCE_THRESHOLD,
};
pub use consensus::registry::{SwipeLog, VoteRegistry};
pub use consensus::resolver::{submit_vote, Ballot};
pub use consensus::ConsensusEngine;
pub use event::{EventChanges, Location, NewEvent, ProposedEvent};
