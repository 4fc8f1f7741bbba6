pub mod advice;
pub mod waste;

pub use advice::{Advice, AdviceRequest, CompostEstimate, MatchedWaste, Report, Suggestion};
pub use waste::{NewWasteEntry, WasteEntry};
