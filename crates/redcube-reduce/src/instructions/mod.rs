mod absolute;
mod base;
mod max;
mod mean;
mod min;
mod op;
mod prod;
mod sum;

pub use absolute::*;
pub use base::*;
pub use max::*;
pub use mean::*;
pub use min::*;
pub use op::*;
pub use prod::*;
pub use sum::*;
