pub mod opponent;
pub mod resolution;
pub mod score;
pub mod session;
pub mod state;
pub mod turns;
pub mod zones;

pub use opponent::{Heuristic, LockPlan, OpponentStrategy};
pub use resolution::{EffectEngine, ResolutionContext, SideResolution, SignalEvent};
pub use score::{RoundOutcome, RoundTotals, ScoreState, Winner};
pub use session::{ActionError, Awaiting, CardView, GameEvent, GameSession};
pub use state::{Phase, RoundState, Step, TurnOrder};
pub use turns::{determine_turn_order, OrderDecision};
pub use zones::{InvariantViolation, Pile, SideBoard};
