mod stats;
mod transfer;
mod user;

pub use stats::cmd_stats;
pub use transfer::{cmd_export, cmd_import};
pub use user::cmd_create_user;
