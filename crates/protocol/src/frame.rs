use bytes::{BufMut, Bytes, BytesMut};

/// Representação de um frame RESP2 de saída.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

impl Frame {
    /// Encoda o frame no buffer de saída em formato RESP2.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(b'+');
                dst.put(s.as_bytes());
                dst.put(&b"\r\n"[..]);
            }
            Frame::Error(s) => {
                dst.put_u8(b'-');
                dst.put(s.as_bytes());
                dst.put(&b"\r\n"[..]);
            }
            Frame::Integer(n) => {
                dst.put_u8(b':');
                dst.put(n.to_string().as_bytes());
                dst.put(&b"\r\n"[..]);
            }
            Frame::Bulk(data) => {
                dst.put_u8(b'$');
                dst.put(data.len().to_string().as_bytes());
                dst.put(&b"\r\n"[..]);
                dst.put(data.as_ref());
                dst.put(&b"\r\n"[..]);
            }
            Frame::Null => {
                dst.put(&b"$-1\r\n"[..]);
            }
            Frame::Array(frames) => {
                dst.put_u8(b'*');
                dst.put(frames.len().to_string().as_bytes());
                dst.put(&b"\r\n"[..]);
                for frame in frames {
                    frame.encode(dst);
                }
            }
        }
    }

    /// Atalho para `encode` num buffer novo.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Helper: cria um Frame::Bulk a partir de &str.
    pub fn bulk(s: &str) -> Frame {
        Frame::Bulk(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Helper: cria um Array de Bulk strings a partir de &[&str].
    /// É o formato de requisição que o decoder aceita.
    pub fn array_from_strs(strs: &[&str]) -> Frame {
        Frame::Array(strs.iter().map(|s| Frame::bulk(s)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_status_replies() {
        assert_eq!(Frame::Simple("OK".into()).to_bytes(), &b"+OK\r\n"[..]);
        assert_eq!(Frame::Simple("PONG".into()).to_bytes(), &b"+PONG\r\n"[..]);
    }

    #[test]
    fn encode_error() {
        let frame = Frame::Error("ERR unknown command 'FOO'".into());
        assert_eq!(frame.to_bytes(), &b"-ERR unknown command 'FOO'\r\n"[..]);
    }

    #[test]
    fn encode_integer() {
        assert_eq!(Frame::Integer(1).to_bytes(), &b":1\r\n"[..]);
        assert_eq!(Frame::Integer(-7).to_bytes(), &b":-7\r\n"[..]);
    }

    #[test]
    fn encode_bulk_uses_byte_length() {
        // "é" ocupa 2 bytes em UTF-8
        let frame = Frame::bulk("café");
        assert_eq!(frame.to_bytes(), "$5\r\ncafé\r\n".as_bytes());

        let binary = Frame::Bulk(Bytes::from_static(b"a\r\nb\x00"));
        assert_eq!(binary.to_bytes(), &b"$5\r\na\r\nb\x00\r\n"[..]);
    }

    #[test]
    fn encode_empty_bulk_is_not_null() {
        assert_eq!(Frame::Bulk(Bytes::new()).to_bytes(), &b"$0\r\n\r\n"[..]);
        assert_eq!(Frame::Null.to_bytes(), &b"$-1\r\n"[..]);
    }

    #[test]
    fn encode_request_array() {
        let frame = Frame::array_from_strs(&["GET", "foo"]);
        assert_eq!(frame.to_bytes(), &b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n"[..]);
    }
}
