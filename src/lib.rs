// Library surface for the engine, stores and headless/integration tests.
// Terminal rendering and the CLI stay in main.rs.
pub mod boss;
pub mod combo;
pub mod config;
pub mod effects;
pub mod error;
pub mod items;
pub mod judge;
pub mod outcome;
pub mod phrases;
pub mod progression;
pub mod reveal;
pub mod runtime;
pub mod session;
pub mod timer;

pub use error::{SessionError, StoreError};
pub use outcome::Outcome;
pub use session::{GameMode, Session, SessionConfig, Status};
