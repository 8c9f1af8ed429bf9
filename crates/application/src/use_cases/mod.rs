//! Application use cases (business logic orchestration).

mod resolve_module;

pub use resolve_module::*;
