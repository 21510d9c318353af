use std::vec;

use bytes::Bytes;
use kestrel_common::CommandError;

/// Cursor sobre os argumentos de um comando decodificado.
///
/// O primeiro argumento é o nome do comando; guardamos em minúsculas para
/// as mensagens de aridade.
pub struct Parse {
    name: String,
    parts: vec::IntoIter<Bytes>,
}

impl Parse {
    pub fn new(args: Vec<Bytes>) -> Result<Parse, CommandError> {
        let mut parts = args.into_iter();
        let name = parts.next().ok_or(CommandError::Empty)?;
        Ok(Parse {
            name: String::from_utf8_lossy(&name).to_lowercase(),
            parts,
        })
    }

    /// Nome do comando, em minúsculas.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retorna o próximo argumento. Falta de argumento é erro de aridade.
    pub fn next_bytes(&mut self) -> Result<Bytes, CommandError> {
        self.parts
            .next()
            .ok_or_else(|| CommandError::WrongArity(self.name.clone()))
    }

    /// Exige pelo menos `n` argumentos restantes.
    pub fn require(&self, n: usize) -> Result<(), CommandError> {
        if self.remaining() < n {
            Err(CommandError::WrongArity(self.name.clone()))
        } else {
            Ok(())
        }
    }

    /// Verifica se ainda há argumentos restantes.
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Retorna o número de argumentos restantes.
    pub fn remaining(&self) -> usize {
        self.parts.len()
    }

    /// Consome todos os argumentos restantes.
    pub fn rest(&mut self) -> Vec<Bytes> {
        self.parts.by_ref().collect()
    }
}
