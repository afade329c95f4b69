mod lifecycle;

pub use lifecycle::{LifecycleError, VServerGroupLifecycle};
