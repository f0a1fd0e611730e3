pub mod access;
pub mod error;
pub mod ids;
pub mod money;
pub mod telemetry;
pub mod traits;

pub use access::{Permission, Role, User};
pub use error::{AppError, Result};
pub use ids::*;
pub use money::ToMoney;
