pub mod availability;
pub mod booking;
pub mod conflict;
pub mod consistency;
pub mod lifecycle;
pub mod schedule;
pub mod sweeper;

pub use availability::*;
pub use booking::*;
pub use conflict::*;
pub use consistency::*;
pub use lifecycle::*;
pub use schedule::*;
pub use sweeper::*;
