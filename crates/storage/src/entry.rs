use bytes::Bytes;
use std::collections::VecDeque;
use tokio::time::Instant;

/// Valor armazenado numa chave. Cada chave guarda exatamente uma variante;
/// sobrescrever troca o valor inteiro, inclusive a variante.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String com TTL opcional. `None` nunca expira.
    String {
        data: Bytes,
        expires_at: Option<Instant>,
    },
    List(VecDeque<Bytes>),
}

impl Value {
    pub fn string(data: Bytes, expires_at: Option<Instant>) -> Self {
        Value::String { data, expires_at }
    }

    /// Só strings expiram; listas nunca.
    pub fn is_expired(&self) -> bool {
        match self {
            Value::String {
                expires_at: Some(t),
                ..
            } => Instant::now() >= *t,
            _ => false,
        }
    }
}
