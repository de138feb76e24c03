use rand::{thread_rng, Rng};

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LENGTH: usize = 8;

/// Generate a random lowercase alphanumeric id.
pub fn random_id() -> String {
    let mut rng = thread_rng();
    (0..ID_LENGTH)
        .map(|_| char::from(ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())]))
        .collect()
}

/// Generate random ids until one is not `taken`.
pub fn random_id_while(mut taken: impl FnMut(&str) -> bool) -> String {
    loop {
        let id = random_id();
        if !taken(&id) {
            return id;
        }
    }
}
