//! Tipos de erro do crate.
//!
//! Tokenização e etiquetagem são funções totais: só a **construção** de
//! modelos e configurações (e a leitura de corpus anotado) pode falhar.

use thiserror::Error;

/// Erro principal das operações de carga e construção.
#[derive(Error, Debug)]
pub enum PosError {
    /// O modelo não declara nenhuma classe (tag); sem classes não há predição.
    #[error("modelo sem classes: a lista de tags está vazia")]
    EmptyClasses,

    /// Uma linha de pesos referencia uma tag que não está em `classes`.
    #[error("tag desconhecida '{label}' na feature '{feature}'")]
    UnknownLabel {
        /// Feature cuja linha contém a tag inválida.
        feature: String,
        /// A tag fora do conjunto de classes.
        label: String,
    },

    /// Padrão especial (regex) inválido na configuração do tokenizador.
    #[error("padrão inválido: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Falha ao decodificar dados JSON (modelo ou opções).
    #[error("erro de desserialização: {0}")]
    Json(#[from] serde_json::Error),

    /// Erro de I/O ao ler o arquivo do modelo.
    #[error("erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Token sem tag em texto pré-anotado (ex: "Pierre" em vez de "Pierre|NNP").
    #[error("corpus malformado na linha {line}: token '{token}' sem tag")]
    MalformedCorpus {
        /// Linha (base 1) onde o token aparece.
        line: usize,
        /// O token problemático.
        token: String,
    },
}

/// Atalho para `Result` com [`PosError`].
pub type Result<T> = std::result::Result<T, PosError>;
