pub mod board;
pub mod error;
pub mod evaluation;
pub mod ordering;
pub mod orchestrator;
pub mod pst;
pub mod search;
pub mod tt;
pub mod types;
pub mod uci;

pub use error::{EngineError, EngineResult};
