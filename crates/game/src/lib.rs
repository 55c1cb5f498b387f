//! Session coordinator for the control panel party game.
//!
//! Panels connect, receive six unique controls from the [`ControlPool`], and race to satisfy
//! the single live [`Task`] issued by the [`TaskEngine`]. [`Coordinator`] ties the pieces
//! together behind one lock and fans events out to every connected panel.

pub mod catalog;
pub mod coordinator;
pub mod pool;
pub mod registry;
pub mod task;

pub use catalog::ControlCatalog;
pub use coordinator::{Coordinator, DeviceSession, GameConfig, Outbox};
pub use pool::ControlPool;
pub use registry::{Device, SessionRegistry};
pub use task::{Submission, Task, TaskEngine};
