//! Field reordering editor.
//!
//! # State Machine
//! ```text
//!            open()                 save()
//! Closed ───────────▶ Open ───────────────▶ Saving ──ok──▶ Closed (+ Updated event)
//!   ▲                 │  ▲                    │
//!   │     cancel()    │  │ move_up/move_down  │ err
//!   └─────────────────┘  └──── SaveFailed ◀───┘
//!                                │  save() retries, cancel() closes
//! ```
//!
//! # Design Decisions
//! - The field list is snapshotted once on open and never re-derived while
//!   the session lives
//! - Orders are kept contiguous (0..N-1) after every move
//! - Save always sends the complete document; the store does full replaces
//! - A failed save keeps the session intact for retry

pub mod session;
pub mod state;

pub use session::{EditSession, EditorEntry};
pub use state::{ConfigEditor, EditorError, EditorState};
