pub mod cipher;
pub mod error;
pub mod validator;

pub use cipher::SecretCipher;
pub use error::SecurityError;
pub use validator::Validator;
