// Domain layer - Records, derived visuals and framing math
pub mod channel;
pub mod chart;
pub mod error;
pub mod marker;
pub mod viewport;
pub mod well;
