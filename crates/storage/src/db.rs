use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::{Duration, Instant};
use tracing::debug;

use kestrel_common::StorageError;

use crate::entry::Value;

/// Estado compartilhado entre todas as conexões.
struct SharedState {
    data: DashMap<Bytes, Value>,
}

/// Handle para o banco de dados in-memory.
///
/// O DashMap protege cada shard com um RwLock: leituras concorrem entre si,
/// escritas são exclusivas no shard. A expiração é passiva: uma string
/// vencida continua no mapa até a próxima leitura ou escrita na chave.
#[derive(Clone)]
pub struct Db {
    shared: Arc<SharedState>,
}

impl Db {
    pub fn new() -> Self {
        Db {
            shared: Arc::new(SharedState {
                data: DashMap::new(),
            }),
        }
    }

    // --- String operations ---

    /// Lê uma string. Chave ausente ou vencida retorna `Ok(None)`; a vencida
    /// é removida como efeito colateral.
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StorageError> {
        {
            let Some(entry) = self.shared.data.get(key) else {
                return Ok(None);
            };
            match entry.value() {
                Value::List(_) => return Err(StorageError::WrongType),
                Value::String { data, .. } if !entry.is_expired() => {
                    return Ok(Some(data.clone()));
                }
                Value::String { .. } => {}
            }
        }

        // Só remove se ainda estiver vencida (pode ter sido re-setada entre
        // soltar o read lock e pegar o write lock)
        if self
            .shared
            .data
            .remove_if(key, |_, value| value.is_expired())
            .is_some()
        {
            debug!("key expirada removida: {}", String::from_utf8_lossy(key));
        }
        Ok(None)
    }

    /// Grava uma string, substituindo qualquer valor anterior.
    pub fn set(&self, key: Bytes, value: Bytes, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.shared.data.insert(key, Value::string(value, expires_at));
    }

    // --- List operations ---

    /// Anexa `elements` ao fim da lista em `key` e retorna o novo tamanho.
    /// Qualquer outro estado da chave (ausente, string, string vencida) é
    /// substituído por uma lista nova.
    pub fn rpush(&self, key: Bytes, elements: &[Bytes]) -> usize {
        match self.shared.data.entry(key) {
            Entry::Occupied(mut occupied) => {
                if let Value::List(list) = occupied.get_mut() {
                    list.extend(elements.iter().cloned());
                    return list.len();
                }
                occupied.insert(Value::List(elements.iter().cloned().collect()));
                elements.len()
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Value::List(elements.iter().cloned().collect()));
                elements.len()
            }
        }
    }

    // --- Inspection ---

    /// Número de entradas no mapa, incluindo strings vencidas ainda não
    /// removidas.
    pub fn len(&self) -> usize {
        self.shared.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.data.is_empty()
    }

    /// Verifica se há entrada física para a chave, sem olhar a expiração.
    pub fn has_entry(&self, key: &[u8]) -> bool {
        self.shared.data.contains_key(key)
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    #[test]
    fn get_set_basic() {
        let db = Db::new();
        db.set(key("key"), Bytes::from("value"), None);
        assert_eq!(db.get(b"key"), Ok(Some(Bytes::from("value"))));
    }

    #[test]
    fn get_nonexistent() {
        let db = Db::new();
        assert_eq!(db.get(b"missing"), Ok(None));
    }

    #[test]
    fn set_overwrites() {
        let db = Db::new();
        db.set(key("key"), Bytes::from("v1"), None);
        db.set(key("key"), Bytes::from("v2"), None);
        assert_eq!(db.get(b"key"), Ok(Some(Bytes::from("v2"))));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn binary_keys_and_values() {
        let db = Db::new();
        let k = Bytes::from_static(b"\x00\xff\r\n");
        let v = Bytes::from_static(b"\xde\xad\xbe\xef");
        db.set(k.clone(), v.clone(), None);
        assert_eq!(db.get(&k), Ok(Some(v)));
    }

    #[tokio::test(start_paused = true)]
    async fn set_with_expiry() {
        let db = Db::new();
        db.set(key("key"), Bytes::from("value"), Some(Duration::from_millis(50)));

        tokio::time::advance(Duration::from_millis(49)).await;
        assert_eq!(db.get(b"key"), Ok(Some(Bytes::from("value"))));

        tokio::time::advance(Duration::from_millis(1)).await;
        // Ainda presente fisicamente: expiração é passiva
        assert!(db.has_entry(b"key"));
        assert_eq!(db.get(b"key"), Ok(None));
        assert!(!db.has_entry(b"key"));
        assert!(db.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_is_already_expired() {
        let db = Db::new();
        db.set(key("key"), Bytes::from("value"), Some(Duration::ZERO));
        assert_eq!(db.get(b"key"), Ok(None));
        assert!(!db.has_entry(b"key"));
    }

    #[tokio::test(start_paused = true)]
    async fn set_clears_previous_ttl() {
        let db = Db::new();
        db.set(key("key"), Bytes::from("v1"), Some(Duration::from_millis(10)));
        db.set(key("key"), Bytes::from("v2"), None);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(db.get(b"key"), Ok(Some(Bytes::from("v2"))));
    }

    #[test]
    fn rpush_creates_and_appends() {
        let db = Db::new();
        assert_eq!(db.rpush(key("list"), &[Bytes::from("a")]), 1);
        assert_eq!(db.rpush(key("list"), &[Bytes::from("b"), Bytes::from("c")]), 3);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn get_on_list_is_wrong_type() {
        let db = Db::new();
        db.rpush(key("list"), &[Bytes::from("a")]);
        assert_eq!(db.get(b"list"), Err(StorageError::WrongType));
        // Dados intactos
        assert!(db.has_entry(b"list"));
        assert_eq!(db.rpush(key("list"), &[Bytes::from("b")]), 2);
    }

    #[test]
    fn set_replaces_list() {
        let db = Db::new();
        db.rpush(key("key"), &[Bytes::from("a"), Bytes::from("b")]);
        db.set(key("key"), Bytes::from("value"), None);
        assert_eq!(db.get(b"key"), Ok(Some(Bytes::from("value"))));
    }

    #[test]
    fn rpush_replaces_string() {
        let db = Db::new();
        db.set(key("key"), Bytes::from("value"), None);
        assert_eq!(db.rpush(key("key"), &[Bytes::from("a")]), 1);
        assert_eq!(db.get(b"key"), Err(StorageError::WrongType));
    }

    #[tokio::test(start_paused = true)]
    async fn rpush_replaces_expired_string() {
        let db = Db::new();
        db.set(key("key"), Bytes::from("value"), Some(Duration::from_millis(5)));
        tokio::time::advance(Duration::from_millis(10)).await;
        assert_eq!(db.rpush(key("key"), &[Bytes::from("a")]), 1);
        assert_eq!(db.get(b"key"), Err(StorageError::WrongType));
    }

    #[test]
    fn concurrent_sets_on_distinct_keys() {
        let db = Db::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let db = db.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        db.set(
                            Bytes::from(format!("key:{t}:{i}")),
                            Bytes::from(format!("value:{t}:{i}")),
                            None,
                        );
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(db.len(), 8 * 500);
        assert_eq!(db.get(b"key:3:42"), Ok(Some(Bytes::from("value:3:42"))));
    }

    #[tokio::test]
    async fn concurrent_rpush_on_same_key_loses_nothing() {
        let db = Db::new();
        let mut handles = Vec::new();

        for t in 0..4 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..250 {
                    db.rpush(Bytes::from("list"), &[Bytes::from(format!("{t}:{i}"))]);
                }
            }));
        }

        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(db.rpush(Bytes::from("list"), &[Bytes::from("last")]), 1001);
    }
}
