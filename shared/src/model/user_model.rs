//! Identity domain models.

/// Registered account. The password hash is opaque bcrypt output; the
/// admin flag lives only in storage and is read through `is_admin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub pass_hash: Vec<u8>,
}

/// Client application allowed to request tokens. Read-only here; the
/// stored secret key is consulted through a `KeySource` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub id: i64,
    pub name: String,
    pub secret_key: Vec<u8>,
}
