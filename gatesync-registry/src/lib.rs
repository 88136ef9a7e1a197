pub mod differ;
pub mod port;
pub mod post_processor;
pub mod registry;

pub use differ::Differ;
pub use port::{EntityPort, PortError};
pub use post_processor::{PostProcessError, PostProcessor};
pub use registry::{dependency_level, KindPlan, KindRegistry};
