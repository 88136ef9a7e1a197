pub mod builder;
pub mod error;
pub mod info;
pub mod natural_key;

pub use builder::{BuiltState, StateBuilder};
pub use error::BuildError;
pub use info::BuildConfig;
