//! # Pipeline — Tokenização + Etiquetagem
//!
//! Conecta o [`Tokenizer`] ao [`Tagger`]: texto bruto entra, tokens
//! etiquetados saem. O etiquetador recebe o mesmo conjunto de emoticons do
//! tokenizador, então todo emoticon mantido inteiro sai como `SYM`.
//!
//! Um documento é processado de forma estritamente sequencial (cada tag
//! depende das duas anteriores). Documentos **independentes** podem ser
//! processados em paralelo com [`Pipeline::analyze_batch`], já que tokenizador
//! e modelo são imutáveis e compartilhados sem trava.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::perceptron::PerceptronModel;
use crate::tagger::{Tagger, Token};
use crate::tokenizer::Tokenizer;

/// O pipeline POS principal.
#[derive(Debug, Clone)]
pub struct Pipeline {
    tokenizer: Tokenizer,
    tagger: Tagger,
}

impl Pipeline {
    /// O etiquetador usa os emoticons da configuração do tokenizador.
    pub fn new(tokenizer: Tokenizer, model: Arc<PerceptronModel>) -> Self {
        let emoticons = tokenizer.config().emoticons().iter().cloned();
        let tagger = Tagger::new(model).with_emoticons(emoticons);
        Self { tokenizer, tagger }
    }

    /// Pipeline com o tokenizador padrão.
    pub fn with_model(model: Arc<PerceptronModel>) -> Self {
        Self::new(Tokenizer::default(), model)
    }

    /// Tokeniza e etiqueta um documento.
    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let start = Instant::now();

        let mut tokens: Vec<Token> = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .map(Token::new)
            .collect();
        self.tagger.tag(&mut tokens);

        debug!(
            chars = text.len(),
            tokens = tokens.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "documento analisado"
        );
        tokens
    }

    /// Analisa vários documentos em paralelo, preservando a ordem de entrada.
    pub fn analyze_batch<S>(&self, texts: &[S]) -> Vec<Vec<Token>>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let results: Vec<Vec<Token>> = texts
            .par_iter()
            .map(|text| self.analyze(text.as_ref()))
            .collect();

        debug!(
            documents = texts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "lote analisado"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perceptron::ModelData;
    use crate::tokenizer::TokenizerConfig;

    const WSJ: &str =
        "Pierre Vinken, 61 years old, will join the board as a nonexecutive director Nov. 29.";

    const WSJ_TAGS: [&str; 18] = [
        "NNP", "NNP", ",", "CD", "NNS", "JJ", ",", "MD", "VB", "DT", "NN", "IN", "DT", "JJ", "NN",
        "NNP", "CD", ".",
    ];

    /// Modelo em miniatura: uma feature `i word` por palavra de conteúdo e
    /// exceções para palavras funcionais e pontuação.
    fn wsj_model() -> Arc<PerceptronModel> {
        let data: ModelData = serde_json::from_value(serde_json::json!({
            "classes": [",", ".", "CD", "DT", "IN", "JJ", "MD", "NN", "NNP", "NNS", "VB"],
            "weights": {
                "bias": {"NN": 0.1},
                "i word pierre": {"NNP": 1.0},
                "i word vinken": {"NNP": 1.0},
                "i word !DIGITS": {"CD": 1.0},
                "i word years": {"NNS": 1.0},
                "i word old": {"JJ": 1.0},
                "i word join": {"VB": 1.0},
                "i word board": {"NN": 1.0},
                "i word nonexecutive": {"JJ": 1.0},
                "i word director": {"NN": 1.0},
                "i word nov.": {"NNP": 1.0}
            },
            "tags": {",": ",", ".": ".", "the": "DT", "a": "DT", "as": "IN", "will": "MD"}
        }))
        .unwrap();
        Arc::new(PerceptronModel::from_data(data).unwrap())
    }

    fn tags(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.tag.as_str()).collect()
    }

    #[test]
    fn test_pipeline_wsj_sentence() {
        let pipeline = Pipeline::with_model(wsj_model());
        let tokens = pipeline.analyze(WSJ);

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "Pierre", "Vinken", ",", "61", "years", "old", ",", "will", "join", "the",
                "board", "as", "a", "nonexecutive", "director", "Nov.", "29", "."
            ]
        );
        assert_eq!(tags(&tokens), WSJ_TAGS);
    }

    #[test]
    fn test_pipeline_empty() {
        let pipeline = Pipeline::with_model(wsj_model());
        assert!(pipeline.analyze("").is_empty());
        assert!(pipeline.analyze("  \n ").is_empty());
    }

    #[test]
    fn test_pipeline_batch_matches_sequential() {
        let pipeline = Pipeline::with_model(wsj_model());
        let texts = vec![WSJ, "", "The board will join :-)", WSJ];

        let batch = pipeline.analyze_batch(&texts);
        let sequential: Vec<Vec<Token>> = texts.iter().map(|t| pipeline.analyze(t)).collect();

        assert_eq!(batch, sequential);
        assert_eq!(tags(&batch[3]), WSJ_TAGS);
        assert_eq!(batch[2].last().map(|t| t.tag.as_str()), Some("SYM"));
    }

    #[test]
    fn test_pipeline_tags_configured_emoticons_as_sym() {
        let config = TokenizerConfig::builder().emoticons(["<3"]).build().unwrap();
        let pipeline = Pipeline::new(Tokenizer::new(config), wsj_model());

        let tokens = pipeline.analyze("love <3 :-)");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["love", "<3", ":-", ")"]);
        assert_eq!(tokens[1].tag, "SYM");
        // Fora do conjunto configurado, ":-" segue o modelo
        assert_ne!(tokens[2].tag, "SYM");
    }

    #[test]
    fn test_pipeline_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
        assert_send_sync::<PerceptronModel>();
    }

    /// Executa a sentença contra um modelo real: `POSTAG_MODEL=/caminho/model.json`.
    #[test]
    #[ignore]
    fn test_pipeline_reference_model() {
        let path = std::env::var("POSTAG_MODEL").expect("defina POSTAG_MODEL");
        let model = Arc::new(PerceptronModel::load(path).unwrap());
        let tokens = Pipeline::with_model(model).analyze(WSJ);
        assert_eq!(tags(&tokens), WSJ_TAGS);
    }
}
