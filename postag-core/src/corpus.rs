//! # Corpus Pré-anotado
//!
//! Leitura de texto já etiquetado no formato `palavra|TAG`, uma sentença por
//! linha:
//!
//! ```text
//! Pierre|NNP Vinken|NNP ,|, 61|CD years|NNS old|JJ
//! ```
//!
//! Usado para medir a acurácia de um modelo carregado
//! ([`Tagger::evaluate`](crate::tagger::Tagger::evaluate)).

use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};

/// Uma sentença anotada: palavras e tags alinhadas por índice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

/// Contagem de acertos de uma avaliação.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    /// Fração de acertos (0.0 quando não há tokens).
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Lê texto pré-anotado; `sep` separa a palavra da tag.
///
/// Linhas em branco são ignoradas. O corte usa a **última** ocorrência de
/// `sep`, então palavras que contêm o separador sobrevivem.
pub fn read_tagged(text: &str, sep: &str) -> Result<Vec<TaggedSentence>> {
    let mut sentences = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let mut sentence = TaggedSentence::default();
        for item in line.split(' ').filter(|item| !item.is_empty()) {
            let Some((word, tag)) = item.rsplit_once(sep) else {
                return Err(PosError::MalformedCorpus {
                    line: line_no + 1,
                    token: item.to_string(),
                });
            };
            sentence.words.push(word.to_string());
            sentence.tags.push(tag.to_string());
        }
        sentences.push(sentence);
    }

    Ok(sentences)
}
