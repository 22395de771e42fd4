//! # Etiquetador Morfossintático (POS)
//!
//! Máquina de estados sequencial: percorre os tokens da esquerda para a
//! direita, sem retrocesso, carregando as duas últimas tags atribuídas.
//!
//! ## Prioridade das regras (por token)
//!
//! | # | Condição                                        | Tag             |
//! |---|-------------------------------------------------|-----------------|
//! | 1 | token literal `-`                               | `-`             |
//! | 2 | emoticon                                        | `SYM`           |
//! | 3 | começa com `@` (menção)                         | `NN`            |
//! | 4 | categoria vazia do Penn Treebank (`*`, `*T*-3`) | `-NONE-`        |
//! | 5 | `-XXX-` (ex: `-LRB-`)                           | o próprio texto |
//! | 6 | palavra exata na tabela de exceções             | tag fixa        |
//! | 7 | senão                                           | predição do modelo |
//!
//! URLs e e-mails não têm tratamento próprio; menções caem na regra 3.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use postag_core::{PerceptronModel, Tagger};
//!
//! let model = Arc::new(PerceptronModel::load("model.json").unwrap());
//! let tagger = Tagger::new(model);
//! for token in tagger.tag_words(&["The", "board", "met", "."]) {
//!     println!("{}/{}", token.text, token.tag);
//! }
//! ```

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::corpus::{Accuracy, TaggedSentence};
use crate::features::{context_window, extract_for_token, START};
use crate::perceptron::PerceptronModel;
use crate::tokenizer::EMOTICONS;

/// Categorias vazias do Penn Treebank: `0`, `*`, `*U*`, `*-12`, `*T*-3`.
static EMPTY_CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0|\*[0-9A-Za-z_?]\*|\*-[0-9]{1,3}|\*[A-Z]+\*-[0-9]{1,3}|\*)$")
        .expect("regex de categoria vazia é válida")
});

/// Tokens mantidos como tag: três maiúsculas entre hífens (`-LRB-`, `-RRB-`).
static VERBATIM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-[A-Z]{3}-$").expect("regex de colchete é válida"));

/// Um token com sua tag POS.
///
/// Criado pelo chamador a partir da saída do tokenizador; `tag` é preenchida
/// exatamente uma vez pelo [`Tagger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// O texto do token (ex: "board", ",", "n't").
    pub text: String,
    /// Tag POS atribuída (ex: "NN").
    pub tag: String,
    /// Rótulo IOB opcional; não é usado pelo etiquetador.
    pub label: String,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Etiquetador Averaged Perceptron.
///
/// O modelo é compartilhado por `Arc`: vários etiquetadores (e threads) usam
/// a mesma tabela de pesos sem trava. O etiquetador não guarda estado entre
/// chamadas.
#[derive(Debug, Clone)]
pub struct Tagger {
    model: Arc<PerceptronModel>,
    emoticons: Arc<HashSet<String>>,
}

impl Tagger {
    pub fn new(model: Arc<PerceptronModel>) -> Self {
        Self {
            model,
            emoticons: Arc::new(EMOTICONS.clone()),
        }
    }

    /// Substitui o conjunto de emoticons etiquetados como `SYM`.
    pub fn with_emoticons<S>(mut self, emoticons: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        self.emoticons = Arc::new(emoticons.into_iter().map(Into::into).collect());
        self
    }

    /// Tag determinística (regras 1–6), sem consultar os pesos.
    fn fixed_tag<'a>(&'a self, word: &'a str) -> Option<Cow<'a, str>> {
        if word == "-" {
            Some(Cow::Borrowed("-"))
        } else if self.emoticons.contains(word) {
            Some(Cow::Borrowed("SYM"))
        } else if word.starts_with('@') {
            Some(Cow::Borrowed("NN"))
        } else if EMPTY_CATEGORY.is_match(word) {
            Some(Cow::Borrowed("-NONE-"))
        } else if VERBATIM.is_match(word) {
            Some(Cow::Borrowed(word))
        } else {
            self.model.exception(word).map(Cow::Borrowed)
        }
    }

    /// Etiqueta os tokens no lugar, da esquerda para a direita.
    pub fn tag(&self, tokens: &mut [Token]) {
        if tokens.is_empty() {
            return;
        }

        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        let context = context_window(&words);

        let mut prev = START[0].to_string();
        let mut prev_prev = START[1].to_string();

        for (i, token) in tokens.iter_mut().enumerate() {
            let word = token.text.as_str();
            let tag = match self.fixed_tag(word) {
                Some(tag) => tag.into_owned(),
                None => {
                    let features = extract_for_token(i, &context, word, &prev, &prev_prev);
                    self.model.predict(&features).to_string()
                }
            };
            trace!(index = i, word, tag = tag.as_str(), "token etiquetado");

            token.tag = tag;
            prev_prev = std::mem::replace(&mut prev, token.tag.clone());
        }
    }

    /// Atalho: cria os tokens a partir das palavras e os etiqueta.
    pub fn tag_words<S: AsRef<str>>(&self, words: &[S]) -> Vec<Token> {
        let mut tokens: Vec<Token> = words.iter().map(|w| Token::new(w.as_ref())).collect();
        self.tag(&mut tokens);
        tokens
    }

    /// Acurácia contra sentenças anotadas; cada sentença é etiquetada isoladamente.
    pub fn evaluate(&self, sentences: &[TaggedSentence]) -> Accuracy {
        let mut accuracy = Accuracy::default();
        for sentence in sentences {
            let predicted = self.tag_words(sentence.words.as_slice());
            for (token, gold) in predicted.iter().zip(&sentence.tags) {
                accuracy.total += 1;
                if &token.tag == gold {
                    accuracy.correct += 1;
                }
            }
        }
        accuracy
    }
}
