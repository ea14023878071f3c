use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};

/// Interchangeable API keys with a shared "active key" cursor.
///
/// The cursor is the only mutable state and only [`CredentialPool::rotate`]
/// moves it. It always stays in `0..len` for a non-empty pool.
pub struct CredentialPool {
    keys: Vec<SecretString>,
    cursor: Mutex<usize>,
}

impl CredentialPool {
    pub fn new(keys: impl IntoIterator<Item = SecretString>) -> Self {
        let keys = keys
            .into_iter()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .collect();
        Self {
            keys,
            cursor: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cursor(&self) -> usize {
        *self.cursor.lock()
    }

    /// Active key together with its index, or `None` for an empty pool.
    pub fn current(&self) -> Option<(usize, SecretString)> {
        let cursor = *self.cursor.lock();
        self.keys.get(cursor).map(|key| (cursor, key.clone()))
    }

    /// Advances the cursor by one, wrapping at the end, and returns the new
    /// position.
    pub fn rotate(&self) -> usize {
        if self.keys.is_empty() {
            return 0;
        }
        let mut cursor = self.cursor.lock();
        *cursor = (*cursor + 1) % self.keys.len();
        *cursor
    }
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.keys.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}
