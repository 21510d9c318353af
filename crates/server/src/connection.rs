use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use kestrel_common::{ConnectionError, INITIAL_BUFFER_CAPACITY};
use kestrel_protocol::{Decoder, Frame};

/// Wrapper sobre TcpStream com buffer de leitura e decoder de comandos.
pub struct Connection {
    stream: BufWriter<TcpStream>,
    buffer: BytesMut,
    decoder: Decoder,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            decoder: Decoder::new(),
        }
    }

    /// Lê o próximo comando do stream. Retorna None no EOF limpo.
    ///
    /// EOF no meio de um comando (ou com lixo ainda no buffer) vira
    /// `ConnectionReset`; o comando parcial é descartado.
    pub async fn read_command(&mut self) -> Result<Option<Vec<Bytes>>, ConnectionError> {
        loop {
            if let Some(args) = self.decoder.decode(&mut self.buffer) {
                return Ok(Some(args));
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                if self.buffer.is_empty() && !self.decoder.in_progress() {
                    return Ok(None);
                }
                return Err(ConnectionError::ConnectionReset);
            }
        }
    }

    /// Escreve um frame no stream.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), ConnectionError> {
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
