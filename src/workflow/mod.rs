pub mod navigator;
pub mod step_policy;

pub use navigator::{NavState, Navigator, Step};
pub use step_policy::{NavigationStyle, StepPolicy};
