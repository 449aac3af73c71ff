pub mod classifier;
pub mod reducer;
pub mod session;

pub use classifier::classify;
pub use reducer::apply;
pub use session::{DashboardSession, handle_frame};
