use tokio::sync::broadcast;
use tracing::debug;

use kestrel_common::{ConnectionError, StorageError};
use kestrel_protocol::{Command, Frame};
use kestrel_storage::Db;

use crate::Connection;

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// Loop principal de tratamento de uma conexão.
///
/// Cada comando é decodificado e respondido antes de ler o próximo. Só erro
/// de transporte, EOF ou shutdown encerram o loop; erros de aridade, de tipo
/// e comandos desconhecidos viram respostas de erro.
pub async fn handle_connection(
    mut conn: Connection,
    db: Db,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<(), ConnectionError> {
    loop {
        let args = tokio::select! {
            result = conn.read_command() => result?,
            _ = shutdown.recv() => {
                return Ok(());
            }
        };

        let args = match args {
            Some(a) => a,
            None => return Ok(()), // EOF
        };

        let response = match Command::from_args(args) {
            Ok(cmd) => {
                debug!("comando recebido: {cmd:?}");
                execute_command(&cmd, &db)
            }
            Err(e) => Some(Frame::Error(format!("ERR {e}"))),
        };

        if let Some(frame) = response {
            conn.write_frame(&frame).await?;
        }
    }
}

/// Executa um comando e retorna o Frame de resposta, se houver.
pub fn execute_command(cmd: &Command, db: &Db) -> Option<Frame> {
    let frame = match cmd {
        Command::Ping => Frame::Simple("PONG".into()),
        Command::Echo(msg) => Frame::Bulk(msg.clone()?),
        Command::Get(key) => match db.get(key) {
            Ok(Some(value)) => Frame::Bulk(value),
            Ok(None) => Frame::Null,
            Err(StorageError::WrongType) => Frame::Error(WRONGTYPE.into()),
        },
        Command::Set { key, value, expire } => {
            db.set(key.clone(), value.clone(), *expire);
            Frame::Simple("OK".into())
        }
        Command::RPush { key, elements } => {
            let len = db.rpush(key.clone(), elements);
            Frame::Integer(len as i64)
        }
        Command::Unknown(name) => Frame::Error(format!("ERR unknown command '{name}'")),
    };
    Some(frame)
}
