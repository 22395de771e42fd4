//! # Extração de Features para o Etiquetador
//!
//! Para cada posição da sentença gera um multiconjunto esparso de features
//! nomeadas que o [`PerceptronModel`](crate::perceptron::PerceptronModel) pontua.
//!
//! ## Janela de contexto
//!
//! As palavras normalizadas recebem dois sentinelas de cada lado, para que
//! a janela `i-2 .. i+2` seja sempre endereçável:
//!
//! ```text
//! -START- -START2- pierre vinken , !DIGITS ... -END- -END2-
//! ```
//!
//! ## Features
//!
//! Cada chave é a junção por espaço de um nome e 1–2 valores:
//!
//! - `bias`
//! - `i suffix`, `i pref1`: sufixo (≤ 3 caracteres) e primeiro caractere da palavra crua
//! - `i-1 tag`, `i-2 tag`, `i tag+i-2 tag`: histórico de tags
//! - `i word`, `i-1 tag+i word`: palavra atual normalizada
//! - `i-1 word`, `i-1 suffix`, `i-2 word`: contexto à esquerda
//! - `i+1 word`, `i+1 suffix`, `i+2 word`: contexto à direita

use std::collections::BTreeMap;

use crate::normalizer::normalize;

/// Sentinelas do início da sentença (também o histórico inicial de tags).
pub const START: [&str; 2] = ["-START-", "-START2-"];
/// Sentinelas do fim da sentença.
pub const END: [&str; 2] = ["-END-", "-END2-"];

/// Multiconjunto de features de um token: chave → contagem.
///
/// Usamos `BTreeMap` para que a soma dos pesos siga sempre a mesma ordem e
/// o resultado da predição não dependa da ordem de iteração de um hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    /// Features ativas com sua contagem. Ex: `{"bias": 1.0, "i word board": 1.0}`.
    pub features: BTreeMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incrementa a feature formada pela junção de `parts` com espaço.
    pub fn add(&mut self, parts: &[&str]) {
        *self.features.entry(parts.join(" ")).or_insert(0.0) += 1.0;
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.features.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.features.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Monta a janela de contexto: 2 sentinelas + palavras normalizadas + 2 sentinelas.
pub fn context_window<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut context = Vec::with_capacity(words.len() + 4);
    context.extend(START.iter().map(|s| s.to_string()));
    context.extend(words.iter().map(|w| normalize(w.as_ref())));
    context.extend(END.iter().map(|s| s.to_string()));
    context
}

/// Últimos (até) 3 caracteres.
fn suffix3(word: &str) -> &str {
    match word.char_indices().rev().nth(2) {
        Some((idx, _)) => &word[idx..],
        None => word,
    }
}

/// Primeiro caractere (vazio se a palavra for vazia).
fn first_char(word: &str) -> &str {
    match word.chars().next() {
        Some(c) => &word[..c.len_utf8()],
        None => "",
    }
}

/// Extrai as features do token na posição `position`.
///
/// # Parâmetros
/// - `context`: janela gerada por [`context_window`];
/// - `word`: texto cru do token;
/// - `prev`, `prev_prev`: as duas últimas tags atribuídas.
///
/// A posição é limitada à janela, então a função nunca indexa fora dela.
pub fn extract_for_token(
    position: usize,
    context: &[String],
    word: &str,
    prev: &str,
    prev_prev: &str,
) -> FeatureVector {
    let at = |j: usize| context.get(j).map(String::as_str).unwrap_or("");
    let i = (position + 2).min(context.len().saturating_sub(3)).max(2);

    let current = at(i);
    let before = at(i - 1);
    let after = at(i + 1);

    let mut fv = FeatureVector::new();
    fv.add(&["bias"]);
    fv.add(&["i suffix", suffix3(word)]);
    fv.add(&["i pref1", first_char(word)]);
    fv.add(&["i-1 tag", prev]);
    fv.add(&["i-2 tag", prev_prev]);
    fv.add(&["i tag+i-2 tag", prev, prev_prev]);
    fv.add(&["i word", current]);
    fv.add(&["i-1 tag+i word", prev, current]);
    fv.add(&["i-1 word", before]);
    fv.add(&["i-1 suffix", suffix3(before)]);
    fv.add(&["i-2 word", at(i - 2)]);
    fv.add(&["i+1 word", after]);
    fv.add(&["i+1 suffix", suffix3(after)]);
    fv.add(&["i+2 word", at(i + 2)]);
    fv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence() -> Vec<String> {
        context_window(&["Pierre", "Vinken", ",", "61", "years"])
    }

    #[test]
    fn test_context_window_padding() {
        let ctx = sentence();
        assert_eq!(ctx.len(), 9);
        assert_eq!(&ctx[..2], ["-START-", "-START2-"]);
        assert_eq!(&ctx[2..7], ["pierre", "vinken", ",", "!DIGITS", "years"]);
        assert_eq!(&ctx[7..], ["-END-", "-END2-"]);
    }

    #[test]
    fn test_first_token_features() {
        let ctx = sentence();
        let fv = extract_for_token(0, &ctx, "Pierre", START[0], START[1]);

        assert_eq!(fv.len(), 14);
        assert_eq!(fv.get("bias"), Some(1.0));
        assert!(fv.contains("i suffix rre"));
        assert!(fv.contains("i pref1 P"));
        assert!(fv.contains("i-1 tag -START-"));
        assert!(fv.contains("i-2 tag -START2-"));
        assert!(fv.contains("i tag+i-2 tag -START- -START2-"));
        assert!(fv.contains("i word pierre"));
        assert!(fv.contains("i-1 tag+i word -START- pierre"));
        assert!(fv.contains("i-1 word -START2-"));
        assert!(fv.contains("i-1 suffix T2-"));
        assert!(fv.contains("i-2 word -START-"));
        assert!(fv.contains("i+1 word vinken"));
        assert!(fv.contains("i+1 suffix ken"));
        assert!(fv.contains("i+2 word ,"));
    }

    #[test]
    fn test_short_words_use_whole_suffix() {
        let ctx = sentence();
        let fv = extract_for_token(2, &ctx, ",", "NNP", "NNP");

        assert!(fv.contains("i suffix ,"));
        assert!(fv.contains("i pref1 ,"));
        assert!(fv.contains("i-1 suffix ken"));
        assert!(fv.contains("i+1 word !DIGITS"));
        assert!(fv.contains("i+1 suffix ITS"));
    }

    #[test]
    fn test_last_token_sees_end_sentinels() {
        let ctx = sentence();
        let fv = extract_for_token(4, &ctx, "years", "CD", ",");
        assert!(fv.contains("i+1 word -END-"));
        assert!(fv.contains("i+2 word -END2-"));
        // Posições além do fim são limitadas ao último token
        let clamped = extract_for_token(40, &ctx, "years", "CD", ",");
        assert_eq!(clamped.features, fv.features);
    }

    #[test]
    fn test_duplicate_keys_accumulate() {
        let mut fv = FeatureVector::new();
        fv.add(&["i word", "x"]);
        fv.add(&["i word", "x"]);
        assert_eq!(fv.get("i word x"), Some(2.0));
        assert_eq!(fv.len(), 1);
    }

    #[test]
    fn test_suffix_counts_characters() {
        assert_eq!(suffix3("café"), "afé");
        assert_eq!(suffix3("ab"), "ab");
        assert_eq!(first_char("über"), "ü");
        assert_eq!(first_char(""), "");
    }
}
