//! Run execution engine: scope resolution, quota enforcement, draft
//! generation, the apply loop, and the background run dispatcher.
//!
//! The engine owns every `PlaybookRun` state transition past QUEUED. The
//! API crate enqueues runs and reads results; the worker binary hosts the
//! [`RunDispatcher`]; both drive the same [`RunProcessor`].

pub mod apply;
pub mod dispatcher;
pub mod draft;
pub mod error;
pub mod estimate;
pub mod fixer;
pub mod generator;
pub mod processor;
pub mod quota;
pub mod scope;

pub use dispatcher::RunDispatcher;
pub use error::EngineError;
pub use processor::RunProcessor;
