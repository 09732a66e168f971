/*!
 # Lighting Schema Editor

 A Rust library for editing the day/night lighting schemas stored on an
 LED controller. A schema is a 48-slot timeline (one slot every 30 minutes)
 where every slot carries an RGB color and three auxiliary channels.

 ## Features

 * Permissive CSV parsing and exact serialization of schemas
 * Grid editing with clamping and targeted row refresh
 * Single-slot color modal with live preview, apply and cancel
 * Load/save against the device HTTP API with demo fallback
 * Status notices with auto-dismiss and English/German strings

 ## Example

 ```no_run
 use schema_editor::*;

 #[tokio::main]
 async fn main() -> Result<()> {
     // Initialize tracing for logs
     tracing_subscriber::fmt::init();

     let config = EditorConfig::default().with_base_url("http://192.168.4.1");
     let store = HttpStore::new(&config)?;
     let mut controller = ScheduleController::new(
         store,
         TextGrid::default(),
         StatusBoard::new(config.notice_timeout),
         Catalog::new(config.language),
     );

     let key: SchemaKey = "schema_01.csv".parse()?;
     controller.load(&key).await;

     // Edit slot 16 (08:00) and store the result
     controller.update_value(16, Field::Red, "255")?;
     controller.save(&key).await;

     Ok(())
 }
 ```
*/

use thiserror::Error;

/// Custom error types for the schema editor library
#[derive(Error, Debug)]
pub enum Error {
    /// Slot index outside of the 48-slot day
    #[error("Slot index {0} out of range (0..48)")]
    SlotOutOfRange(usize),

    /// The color modal is already editing a slot
    #[error("Slot {0} is already being edited")]
    EditInProgress(usize),

    /// Schema key is not a plain file name
    #[error("Invalid schema key: {0:?}")]
    InvalidSchemaKey(String),

    /// Storage answered with a non-success status
    #[error("Storage rejected the request with status {0}")]
    StorageRejected(u16),

    /// Storage could not be reached or has no data for the key
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// General error
    #[error("Error: {0}")]
    General(String),

    /// Error from reqwest
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
pub mod controller;
pub mod editor;
pub mod grid;
pub mod notify;
pub mod schedule;
pub mod slot;
pub mod storage;

// Re-export key types
pub use config::EditorConfig;
pub use controller::{LoadOutcome, SaveOutcome, ScheduleController, STATUS_ELEMENT};
pub use editor::{ColorModal, Editor};
pub use grid::{GridRow, ScheduleView, TextGrid};
pub use notify::{Catalog, Language, Notice, NoticeKind, Notify, StatusBoard, Translate};
pub use schedule::{parse_rows, Schedule, SchemaKey};
pub use slot::{Field, Rgb, ScheduleSlot, SLOTS_PER_DAY};
pub use storage::{HttpStore, MemoryStore, SchemaStore};
