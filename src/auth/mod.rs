pub mod extractor;
pub mod jwt;
pub mod password;
pub mod permissions;

pub use extractor::*;
pub use jwt::*;
pub use password::*;
pub use permissions::*;
