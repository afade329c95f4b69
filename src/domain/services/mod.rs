mod reconciler;

pub use reconciler::{BindingDiff, Reconciler};
