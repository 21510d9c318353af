use std::mem;

use bytes::{Bytes, BytesMut};
use tracing::debug;

use kestrel_common::ProtocolError;

/// Decoder incremental de arrays de bulk strings
/// (`*<N>\r\n` seguido de N vezes `$<L>\r\n<L bytes>\r\n`).
///
/// É tolerante: linhas que não são cabeçalho de array são descartadas, e
/// um cabeçalho de bulk malformado aborta o comando corrente sem fechar a
/// conexão. Os dois bytes que seguem o payload são consumidos sem validar
/// que sejam CRLF. Não há limite para N nem para L.
///
/// O estado sobrevive entre chamadas, então um comando pode chegar
/// fragmentado em qualquer ponto do stream.
#[derive(Debug, Default)]
pub struct Decoder {
    state: State,
    args: Vec<Bytes>,
    /// Bytes do início de `buf` já varridos sem achar `\n`.
    scanned: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    /// Procurando uma linha `*<N>`.
    #[default]
    Array,
    /// Esperando a linha `$<L>`; `remaining` conta o argumento atual.
    BulkLen { remaining: usize },
    /// Esperando `len + 2` bytes de payload.
    BulkData { len: usize, remaining: usize },
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consome bytes de `buf` até completar um comando.
    ///
    /// Retorna `None` quando precisa de mais dados; o que já foi consumido
    /// fica guardado no decoder.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Option<Vec<Bytes>> {
        loop {
            match self.state {
                State::Array => {
                    let line = self.take_line(buf)?;
                    match parse_header(&line, b'*') {
                        Ok(count) if count > 0 => {
                            self.state = State::BulkLen {
                                remaining: count as usize,
                            };
                        }
                        Ok(_) => {}
                        Err(e) => debug!("linha descartada: {e}"),
                    }
                }
                State::BulkLen { remaining } => {
                    let line = self.take_line(buf)?;
                    let header = parse_header(&line, b'$').and_then(|len| {
                        if len < 0 {
                            Err(ProtocolError::InvalidBulkLength(len))
                        } else {
                            Ok(len as usize)
                        }
                    });
                    match header {
                        Ok(len) => self.state = State::BulkData { len, remaining },
                        Err(e) => {
                            debug!("comando abortado: {e}");
                            self.state = State::Array;
                            if let Some(command) = self.take_command() {
                                return Some(command);
                            }
                        }
                    }
                }
                State::BulkData { len, remaining } => {
                    let needed = len.saturating_add(2);
                    if buf.len() < needed {
                        return None;
                    }
                    let mut payload = buf.split_to(needed).freeze();
                    payload.truncate(len);
                    self.args.push(payload);

                    if remaining > 1 {
                        self.state = State::BulkLen {
                            remaining: remaining - 1,
                        };
                    } else {
                        self.state = State::Array;
                        return self.take_command();
                    }
                }
            }
        }
    }

    /// Indica se há um comando parcialmente decodificado.
    pub fn in_progress(&self) -> bool {
        self.state != State::Array || !self.args.is_empty()
    }

    fn take_command(&mut self) -> Option<Vec<Bytes>> {
        if self.args.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.args))
        }
    }

    /// Remove do buffer a próxima linha terminada em `\n`, sem o `\r\n` final.
    /// Uma linha terminada só em `\n` mantém o `\n`.
    ///
    /// A busca retoma de `scanned`, então uma linha longa que chega em
    /// pedaços é varrida uma única vez.
    fn take_line(&mut self, buf: &mut BytesMut) -> Option<Bytes> {
        let start = self.scanned.min(buf.len());
        let Some(pos) = buf[start..].iter().position(|b| *b == b'\n') else {
            self.scanned = buf.len();
            return None;
        };
        self.scanned = 0;
        let mut line = buf.split_to(start + pos + 1).freeze();
        if line.ends_with(b"\r\n") {
            line.truncate(line.len() - 2);
        }
        Some(line)
    }
}

fn parse_header(line: &[u8], prefix: u8) -> Result<i64, ProtocolError> {
    let (&first, digits) = line.split_first().ok_or(ProtocolError::EmptyLine)?;
    if first != prefix {
        return Err(ProtocolError::UnexpectedPrefix {
            expected: prefix,
            found: first,
        });
    }
    let s = std::str::from_utf8(digits)
        .map_err(|_| ProtocolError::InvalidInteger(String::from_utf8_lossy(digits).into_owned()))?;
    s.parse::<i64>()
        .map_err(|_| ProtocolError::InvalidInteger(s.to_string()))
}
