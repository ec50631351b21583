//! Log capture for hosts and tests.
//!
//! The engine logs through the [`log`] facade. A host that wants to display or inspect those
//! records can install a [`ChannelLogger`], which forwards every enabled record into a crossbeam
//! channel.

mod channel;

pub use channel::{ChannelLogger, LogMessage};
