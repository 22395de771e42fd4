//! # postag-core — Tokenização e Etiquetagem POS
//!
//! Este crate implementa o núcleo linguístico usado por ferramentas de
//! qualidade de texto: um **tokenizador** baseado em regras e um
//! **etiquetador morfossintático** (POS) Averaged Perceptron, que roda apenas
//! inferência sobre uma tabela de pesos pré-treinada.
//!
//! ## Arquitetura
//!
//! 1.  **Entrada**: Texto bruto (`&str`).
//! 2.  **Tokenização** ([`tokenizer`]): spans sem espaço são divididos por
//!     prefixos, contrações e sufixos; emoticons e abreviações ficam inteiros.
//! 3.  **Normalização** ([`normalizer`]): cada palavra vira uma chave
//!     (`1999` → `!YEAR`, `Hello` → `hello`).
//! 4.  **Features** ([`features`]): janela `i-2 .. i+2` + histórico de tags.
//! 5.  **Modelo** ([`perceptron`]): pontuação linear e argmax.
//! 6.  **Etiquetagem** ([`tagger`]): regras rápidas ou modelo, da esquerda
//!     para a direita.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use postag_core::{PerceptronModel, Pipeline};
//!
//! // 1. Carrega o modelo uma única vez (falha aqui é fatal)
//! let model = Arc::new(PerceptronModel::load("model.json").expect("modelo"));
//!
//! // 2. Monta o pipeline com o tokenizador padrão
//! let pipeline = Pipeline::with_model(model);
//!
//! // 3. Analisa o texto
//! for token in pipeline.analyze("Pierre Vinken, 61 years old, will join the board.") {
//!     println!("{}/{}", token.text, token.tag);
//! }
//! ```

pub mod corpus;
pub mod error;
pub mod features;
pub mod normalizer;
pub mod perceptron;
pub mod pipeline;
pub mod tagger;
pub mod tokenizer;

pub use error::{PosError, Result};
pub use perceptron::{ModelData, PerceptronModel};
pub use pipeline::Pipeline;
pub use tagger::{Tagger, Token};
pub use tokenizer::{Tokenizer, TokenizerConfig};
