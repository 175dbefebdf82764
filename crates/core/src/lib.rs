// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bq-core: shared vocabulary for the build queue scheduler.
//!
//! This crate defines the opaque capability traits (`Task`, `Action`) the
//! scheduler is generic over, the item lifecycle model, id allocation, and
//! the small collaborator interfaces (`Node`, `ResourceController`) the
//! scheduler consults but does not implement.

pub mod action;
pub mod clock;
pub mod id;
pub mod item;
pub mod node;
pub mod resource;
pub mod task;
pub mod work_unit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use action::{resolve_label, should_schedule_anyway, Action};
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{IdGen, ItemId, ItemIdAllocator, ShortId, UuidIdGen, WorkUnitId, WorkUnitIdAllocator};
pub use item::{
    BlockedItem, BuildableItem, CompletionReceiver, Item, ItemCore, ItemOutcome, PendingItem,
    WaitingItem,
};
pub use node::{Node, NodeId, TaskRequirements};
pub use resource::{ResourceController, ResourceId};
pub use task::{Label, SubTaskHandle, Task};
pub use work_unit::{WorkUnit, WorkUnitContext};
