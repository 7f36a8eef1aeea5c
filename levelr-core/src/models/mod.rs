mod goal;
mod level;
mod user;

pub use goal::*;
pub use level::*;
pub use user::*;
