// Operations
mod operations;
pub use operations::*;

// Values
mod money;
pub use money::*;

// Models
mod members;
pub use members::*;

mod trainers;
pub use trainers::*;

mod payments;
pub use payments::*;

mod attendance;
pub use attendance::*;
