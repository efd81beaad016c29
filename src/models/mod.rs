pub mod ingredient;
pub mod recipe;
pub mod subscription;
pub mod tag;
pub mod user;

pub use ingredient::*;
pub use recipe::*;
pub use subscription::*;
pub use tag::*;
pub use user::*;
