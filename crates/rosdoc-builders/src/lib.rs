//! Documentation builder backends for rosdoc.
//!
//! Each backend wraps one external documentation tool. The
//! [`BuilderRegistry`] fixes which backends exist and the order they run in.

pub mod command;
pub mod doxygen;
pub mod epydoc;
pub mod registry;
pub mod spec;
pub mod sphinx;
pub mod tagfiles;
pub mod traits;

pub use command::ToolCommand;
pub use doxygen::DoxygenBuilder;
pub use epydoc::EpydocBuilder;
pub use registry::BuilderRegistry;
pub use spec::BuilderSpec;
pub use sphinx::SphinxBuilder;
pub use tagfiles::{load_tagfile_spec, TagfileEntry};
pub use traits::{BuildJob, Builder, BuilderError, BuilderKind};
