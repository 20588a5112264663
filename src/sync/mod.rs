//! Customer → model → station synchronization.

pub mod options;
pub mod session;
pub mod synchronizer;

pub use options::{FieldState, FieldView, OptionEntry, OptionSet, populate_options};
pub use session::{Completion, FilterSession};
pub use synchronizer::{
    Applied, DependentField, FilterView, LookupRequest, LookupTicket, Synchronizer,
};
