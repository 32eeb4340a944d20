use rand::rngs::OsRng;
use rand::RngCore;

/// Session token length before hex encoding (256 bits).
const TOKEN_BYTES: usize = 32;

/// Todo id length before hex encoding (128 bits).
const TODO_ID_BYTES: usize = 16;

/// Generate a bearer token from the OS CSPRNG
pub fn generate_token() -> String {
    random_hex::<TOKEN_BYTES>()
}

/// Generate an unguessable todo identifier
pub fn generate_todo_id() -> String {
    random_hex::<TODO_ID_BYTES>()
}

fn random_hex<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
