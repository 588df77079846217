use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Encryption secret not found in configuration")]
    MissingSecret,

    #[error("failed to encrypt value")]
    Encrypt,

    /// Wrong key, or the token was tampered with.
    #[error("failed to decrypt value")]
    Decrypt,

    #[error("encrypted value is malformed: {0}")]
    Encoding(String),
}
