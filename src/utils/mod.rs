pub mod clock;
pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod validation;

pub use clock::Clock;
pub use code_generator::generate_six_digit_code;
pub use jwt::*;
pub use password::*;
pub use validation::*;
