pub mod enums;
pub mod medication;
pub mod notification;
pub mod user;

pub use enums::*;
pub use medication::*;
pub use notification::*;
pub use user::*;
