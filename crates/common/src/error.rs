/// Malformações de framing detectadas pelo decoder.
///
/// Nunca chegam ao cliente: o decoder descarta a linha (ou o comando
/// parcial) e volta a procurar o próximo cabeçalho `*`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("linha vazia")]
    EmptyLine,
    #[error("prefixo inesperado: {found:#x} (esperado {expected:#x})")]
    UnexpectedPrefix { expected: u8, found: u8 },
    #[error("inteiro inválido: {0}")]
    InvalidInteger(String),
    #[error("comprimento de bulk inválido: {0}")]
    InvalidBulkLength(i64),
}

/// Erros de armazenamento/engine de dados.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("operação contra chave com tipo errado")]
    WrongType,
}

/// Erros de conexão TCP.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("conexão resetada pelo peer")]
    ConnectionReset,
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Erros de validação de comandos. A mensagem vai para o cliente
/// prefixada com `ERR`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Lista de argumentos vazia. Só acontece quando `Command::from_args`
    /// é chamado direto; o decoder não emite comandos vazios.
    #[error("empty command")]
    Empty,
    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(String),
}
