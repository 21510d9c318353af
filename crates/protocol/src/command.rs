use std::time::Duration;

use bytes::Bytes;
use kestrel_common::CommandError;

use crate::Parse;

/// Enum com todos os comandos suportados.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping,
    /// `None` quando o ECHO vem sem argumento; não gera resposta.
    Echo(Option<Bytes>),
    Get(Bytes),
    Set {
        key: Bytes,
        value: Bytes,
        expire: Option<Duration>,
    },
    RPush {
        key: Bytes,
        elements: Vec<Bytes>,
    },
    Unknown(String),
}

impl Command {
    /// Faz o parse dos argumentos decodificados em um Command.
    /// O nome do comando não diferencia maiúsculas de minúsculas.
    ///
    /// Uma lista vazia vira `CommandError::Empty`. O `Decoder` nunca emite
    /// comando vazio; o erro existe para quem chama `from_args` direto.
    pub fn from_args(args: Vec<Bytes>) -> Result<Command, CommandError> {
        let mut parse = Parse::new(args)?;
        let name = parse.name().to_string();

        let cmd = match name.as_str() {
            "ping" => Command::Ping,
            "echo" => {
                let msg = if parse.has_remaining() {
                    Some(parse.next_bytes()?)
                } else {
                    None
                };
                Command::Echo(msg)
            }
            "get" => Command::Get(parse.next_bytes()?),
            "set" => parse_set(&mut parse)?,
            "rpush" => {
                parse.require(2)?;
                let key = parse.next_bytes()?;
                Command::RPush {
                    key,
                    elements: parse.rest(),
                }
            }
            _ => Command::Unknown(name),
        };

        Ok(cmd)
    }
}

/// `SET key value [PX ms]`. O PX só vale na forma exata de 5 argumentos;
/// qualquer outro sufixo é ignorado.
fn parse_set(parse: &mut Parse) -> Result<Command, CommandError> {
    parse.require(2)?;
    let key = parse.next_bytes()?;
    let value = parse.next_bytes()?;

    let mut expire = None;
    if parse.remaining() == 2 {
        let opt = parse.next_bytes()?;
        let ms = parse.next_bytes()?;
        if opt.eq_ignore_ascii_case(b"PX") {
            // ms não numérico: sem expiração
            expire = parse_millis(&ms);
        }
    }

    Ok(Command::Set { key, value, expire })
}

/// Milissegundos não positivos viram duração zero, ou seja, a chave já
/// nasce expirada.
fn parse_millis(raw: &[u8]) -> Option<Duration> {
    let ms = std::str::from_utf8(raw).ok()?.parse::<i64>().ok()?;
    Some(Duration::from_millis(ms.max(0) as u64))
}
