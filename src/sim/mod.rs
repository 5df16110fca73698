//! Deterministic simulation module
//!
//! All timing and judgement logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Time comes from the tick input (audio position), never from a wall clock
//! - Stable iteration order (chart order, by note ID)
//! - No rendering or platform dependencies

pub mod clock;
pub mod judge;
pub mod note;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use clock::{Clock, ClockPhase};
pub use judge::{classify, judge};
pub use note::{Note, NoteId};
pub use scheduler::Scheduler;
pub use state::{GameEvent, Judgement, Session, Summary};
pub use tick::{TickInput, tick};
