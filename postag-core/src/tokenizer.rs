//! # Tokenizador Baseado em Regras
//!
//! Divide o texto bruto em tokens (palavras, pontuações, contrações) usando um
//! conjunto de regras configurável. A tokenização é **total**: nunca falha e
//! devolve uma sequência vazia para texto vazio.
//!
//! ## Algoritmo
//!
//! 1. **Sanitização**: aspas tipográficas viram ASCII (`“` → `"`, `’` → `'`).
//! 2. **Spans**: o texto é particionado em trechos contíguos sem espaço.
//! 3. **Divisão do span** (repetida até esgotar o span):
//!    - emoticon, abreviação (`N.B.A.`, `Mr.`) ou predicado do usuário → token único;
//!    - prefixo (`$100` → `$`, `100`);
//!    - contração / split-case (`don't` → `do`, `n't`);
//!    - sufixo (`Well)` → `Well`, `)`), acumulado à parte e emitido no fim;
//!    - senão, o resto do span vira um token.
//!
//! Spans repetidos no mesmo documento são memoizados num cache local à chamada.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use postag_core::tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::default();
//! let tokens = tokenizer.tokenize("They'll pay $100 (maybe).");
//! assert_eq!(tokens, ["They", "'ll", "pay", "$", "100", "(", "maybe", ")", "."]);
//! ```

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Caracteres destacados do início de um span.
pub const DEFAULT_PREFIXES: &[char] = &['$', '(', '"', '['];

/// Caracteres destacados do fim de um span.
pub const DEFAULT_SUFFIXES: &[char] = &[',', ')', '"', ']', '!', ';', '.', '?', ':', '\''];

/// Contrações do inglês separadas da palavra base.
pub const DEFAULT_CONTRACTIONS: &[&str] = &["'ll", "'s", "'re", "'m", "n't"];

/// Abreviações com pontos (`U.S.`, `i.e.`) e títulos curtos (`Mr.`, `Nov.`).
pub const DEFAULT_SPECIAL_PATTERN: &str = r"^(?:[A-Za-z]\.){2,}$|^[A-Z][a-z]{1,2}\.$";

/// Emoticons reconhecidos como tokens indivisíveis (e etiquetados `SYM`).
pub const DEFAULT_EMOTICONS: &[&str] = &[
    "(-8", "(-;", "(-_-)", "(._.)", "(:", "(=", "(o:", "(¬_¬)", "(ಠ_ಠ)", "(╯°□°）╯︵┻━┻",
    "-__-", "8-)", "8-D", "8D", ":(", ":((", ":(((", ":()", ":)))", ":-)", ":-))", ":-)))",
    ":-*", ":-/", ":-X", ":-]", ":-o", ":-p", ":-x", ":-|", ":-}", ":0", ":3", ":P", ":]",
    ":`(", ":`)", ":`-(", ":o", ":o)", "=(", "=)", "=D", "=|", "@_@", "O.o", "O_o", "V_V",
    "XDD", "[-:", "^___^", "o_0", "o_O", "o_o", "v_v", "xD", "xDD", "¯\\(ツ)/¯",
];

static SPECIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_SPECIAL_PATTERN).expect("padrão especial padrão é válido")
});

/// Conjunto padrão de emoticons, compartilhado com o etiquetador.
pub static EMOTICONS: Lazy<HashSet<String>> =
    Lazy::new(|| DEFAULT_EMOTICONS.iter().map(|e| e.to_string()).collect());

/// Predicado do usuário que marca um span como indivisível.
pub type Unsplittable = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Tabela fixa de substituições tipográficas → ASCII aplicada antes da varredura.
///
/// As substituições são literais e feitas numa única passada da esquerda para
/// a direita: o texto já substituído nunca é reexaminado. Quando mais de uma
/// regra casa na mesma posição, vence a que foi declarada primeiro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sanitizer {
    replacements: Vec<(String, String)>,
}

impl Sanitizer {
    /// Sanitizador sem nenhuma regra (o texto passa intacto).
    pub fn empty() -> Self {
        Self {
            replacements: Vec::new(),
        }
    }

    /// Acrescenta uma substituição `from` → `to`.
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        if !from.is_empty() {
            self.replacements.push((from, to.into()));
        }
        self
    }

    /// Aplica todas as substituições. Sem ocorrências, devolve o texto emprestado.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        // `from` vazio pode chegar por desserialização e nunca casa
        let rules: Vec<&(String, String)> = self
            .replacements
            .iter()
            .filter(|(from, _)| !from.is_empty() && text.contains(from.as_str()))
            .collect();
        if rules.is_empty() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(ch) = rest.chars().next() {
            match rules.iter().find(|(from, _)| rest.starts_with(from.as_str())) {
                Some((from, to)) => {
                    out.push_str(to);
                    rest = &rest[from.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        Cow::Owned(out)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::empty()
            .with("\u{201c}", "\"")
            .with("\u{201d}", "\"")
            .with("\u{2018}", "'")
            .with("\u{2019}", "'")
            .with("&rsquo;", "'")
    }
}

/// Configuração imutável do tokenizador.
///
/// Construída uma vez (via [`TokenizerConfig::builder`] ou
/// [`TokenizerConfig::from_options`]) e nunca alterada depois.
/// É `Send + Sync`: pode ser compartilhada entre threads sem trava.
#[derive(Clone)]
pub struct TokenizerConfig {
    prefixes: HashSet<char>,
    suffixes: HashSet<char>,
    /// Split-cases do usuário seguidos das contrações, já em minúsculas.
    split_cases: Vec<String>,
    emoticons: HashSet<String>,
    special: Regex,
    unsplittable: Option<Unsplittable>,
    sanitizer: Sanitizer,
    retain_suffixes: bool,
}

impl TokenizerConfig {
    pub fn builder() -> TokenizerConfigBuilder {
        TokenizerConfigBuilder::default()
    }

    /// Constrói a configuração a partir de opções serializáveis.
    ///
    /// Campos ausentes mantêm o valor padrão.
    pub fn from_options(options: TokenizerOptions) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(prefixes) = options.prefixes {
            builder = builder.prefixes(prefixes);
        }
        if let Some(suffixes) = options.suffixes {
            builder = builder.suffixes(suffixes);
        }
        if let Some(split_cases) = options.split_cases {
            builder = builder.split_cases(split_cases);
        }
        if let Some(contractions) = options.contractions {
            builder = builder.contractions(contractions);
        }
        if let Some(emoticons) = options.emoticons {
            builder = builder.emoticons(emoticons);
        }
        if let Some(pattern) = options.special_pattern {
            builder = builder.special_pattern(pattern);
        }
        if let Some(sanitizer) = options.sanitizer {
            builder = builder.sanitizer(sanitizer);
        }
        if !options.retain_suffixes.unwrap_or(true) {
            builder = builder.without_suffixes();
        }
        builder.build()
    }

    pub fn retains_suffixes(&self) -> bool {
        self.retain_suffixes
    }

    pub fn emoticons(&self) -> &HashSet<String> {
        &self.emoticons
    }

    fn is_special(&self, span: &str) -> bool {
        self.emoticons.contains(span)
            || self.special.is_match(span)
            || self.unsplittable.as_ref().is_some_and(|f| f(span))
    }

    /// Posição (em bytes) onde o span deve ser cortado por um split-case.
    ///
    /// A busca ignora maiúsculas e só aceita ocorrências a partir do segundo
    /// caractere, com o span mais longo que o split-case.
    fn split_index(&self, span: &str) -> Option<usize> {
        let span_len = span.chars().count();
        self.split_cases.iter().find_map(|case| {
            if span_len <= case.chars().count() {
                return None;
            }
            span.char_indices()
                .skip(1)
                .map(|(idx, _)| idx)
                .find(|&idx| starts_with_ignore_case(&span[idx..], case))
        })
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().copied().collect(),
            suffixes: DEFAULT_SUFFIXES.iter().copied().collect(),
            split_cases: DEFAULT_CONTRACTIONS.iter().map(|c| c.to_string()).collect(),
            emoticons: EMOTICONS.clone(),
            special: SPECIAL_RE.clone(),
            unsplittable: None,
            sanitizer: Sanitizer::default(),
            retain_suffixes: true,
        }
    }
}

impl fmt::Debug for TokenizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizerConfig")
            .field("prefixes", &self.prefixes)
            .field("suffixes", &self.suffixes)
            .field("split_cases", &self.split_cases)
            .field("emoticons", &self.emoticons.len())
            .field("special", &self.special.as_str())
            .field("unsplittable", &self.unsplittable.is_some())
            .field("sanitizer", &self.sanitizer)
            .field("retain_suffixes", &self.retain_suffixes)
            .finish()
    }
}

/// Compara `haystack` com o início de `needle_lower` ignorando maiúsculas.
fn starts_with_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    let mut lowered = haystack.chars().flat_map(char::to_lowercase);
    needle_lower.chars().all(|c| lowered.next() == Some(c))
}

/// Builder de [`TokenizerConfig`]; cada método substitui o valor padrão.
pub struct TokenizerConfigBuilder {
    prefixes: Vec<char>,
    suffixes: Vec<char>,
    split_cases: Vec<String>,
    contractions: Vec<String>,
    emoticons: Option<HashSet<String>>,
    special_pattern: Option<String>,
    unsplittable: Option<Unsplittable>,
    sanitizer: Sanitizer,
    retain_suffixes: bool,
}

impl Default for TokenizerConfigBuilder {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.to_vec(),
            suffixes: DEFAULT_SUFFIXES.to_vec(),
            split_cases: Vec::new(),
            contractions: DEFAULT_CONTRACTIONS.iter().map(|c| c.to_string()).collect(),
            emoticons: None,
            special_pattern: None,
            unsplittable: None,
            sanitizer: Sanitizer::default(),
            retain_suffixes: true,
        }
    }
}

impl TokenizerConfigBuilder {
    pub fn prefixes(mut self, prefixes: impl IntoIterator<Item = char>) -> Self {
        self.prefixes = prefixes.into_iter().collect();
        self
    }

    pub fn suffixes(mut self, suffixes: impl IntoIterator<Item = char>) -> Self {
        self.suffixes = suffixes.into_iter().collect();
        self
    }

    /// Substrings extras que forçam divisão (ex: `"("` em `amount($)`).
    pub fn split_cases<S: Into<String>>(mut self, cases: impl IntoIterator<Item = S>) -> Self {
        self.split_cases = cases.into_iter().map(Into::into).collect();
        self
    }

    /// Substitui o conjunto de contrações (padrão: `'ll 's 're 'm n't`).
    pub fn contractions<S: Into<String>>(mut self, cases: impl IntoIterator<Item = S>) -> Self {
        self.contractions = cases.into_iter().map(Into::into).collect();
        self
    }

    pub fn emoticons<S: Into<String>>(mut self, emoticons: impl IntoIterator<Item = S>) -> Self {
        self.emoticons = Some(emoticons.into_iter().map(Into::into).collect());
        self
    }

    /// Regex de spans indivisíveis (abreviações). Compilada em [`build`](Self::build).
    pub fn special_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.special_pattern = Some(pattern.into());
        self
    }

    pub fn unsplittable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.unsplittable = Some(Arc::new(predicate));
        self
    }

    pub fn sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Modo "no-suffix": pontuação final é descartada em vez de virar token.
    pub fn without_suffixes(mut self) -> Self {
        self.retain_suffixes = false;
        self
    }

    pub fn build(self) -> Result<TokenizerConfig> {
        let special = match self.special_pattern {
            Some(pattern) => Regex::new(&pattern)?,
            None => SPECIAL_RE.clone(),
        };

        let split_cases: Vec<String> = self
            .split_cases
            .into_iter()
            .chain(self.contractions)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_lowercase())
            .collect();

        let config = TokenizerConfig {
            prefixes: self.prefixes.into_iter().collect(),
            suffixes: self.suffixes.into_iter().collect(),
            split_cases,
            emoticons: self.emoticons.unwrap_or_else(|| EMOTICONS.clone()),
            special,
            unsplittable: self.unsplittable,
            sanitizer: self.sanitizer,
            retain_suffixes: self.retain_suffixes,
        };
        debug!(?config, "configuração do tokenizador construída");
        Ok(config)
    }
}

/// Versão serializável das opções do tokenizador (ex: lida de um JSON).
///
/// O predicado `unsplittable` não tem representação em dados e só pode ser
/// definido pelo builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TokenizerOptions {
    pub prefixes: Option<Vec<char>>,
    pub suffixes: Option<Vec<char>>,
    pub split_cases: Option<Vec<String>>,
    pub contractions: Option<Vec<String>>,
    pub emoticons: Option<Vec<String>>,
    pub special_pattern: Option<String>,
    pub sanitizer: Option<Sanitizer>,
    pub retain_suffixes: Option<bool>,
}

/// Tokenizador iterativo sobre spans.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokeniza o texto, preservando a ordem esquerda → direita.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let clean = self.config.sanitizer.apply(text);
        let mut tokens = Vec::new();
        // Cache por chamada: span literal → sub-tokens
        let mut cache: HashMap<&str, Vec<String>> = HashMap::new();

        let mut start = None;
        for (idx, ch) in clean.char_indices() {
            if ch.is_whitespace() {
                if let Some(from) = start.take() {
                    self.push_span(&clean[from..idx], &mut cache, &mut tokens);
                }
            } else if start.is_none() {
                start = Some(idx);
            }
        }
        if let Some(from) = start {
            self.push_span(&clean[from..], &mut cache, &mut tokens);
        }

        tokens
    }

    fn push_span<'a>(
        &self,
        span: &'a str,
        cache: &mut HashMap<&'a str, Vec<String>>,
        tokens: &mut Vec<String>,
    ) {
        let pieces = cache.entry(span).or_insert_with(|| self.split_span(span));
        tokens.extend(pieces.iter().cloned());
    }

    /// Divide um span (sem espaços) em sub-tokens.
    fn split_span(&self, span: &str) -> Vec<String> {
        let config = &self.config;
        let mut tokens = Vec::new();
        // Sufixos destacados, na ordem em que saíram (direita → esquerda)
        let mut detached = Vec::new();
        let mut rest = span;

        while !rest.is_empty() {
            if config.is_special(rest) {
                tokens.push(rest.to_string());
                break;
            }

            let before = rest.chars().count();
            let first = rest.chars().next().unwrap_or_default();
            let last = rest.chars().next_back().unwrap_or_default();

            if before > 1 && config.prefixes.contains(&first) {
                tokens.push(first.to_string());
                rest = &rest[first.len_utf8()..];
            } else if let Some(idx) = config.split_index(rest) {
                tokens.push(rest[..idx].to_string());
                rest = &rest[idx..];
            } else if config.suffixes.contains(&last) {
                if config.retain_suffixes {
                    detached.push(last.to_string());
                }
                rest = &rest[..rest.len() - last.len_utf8()];
            } else {
                tokens.push(rest.to_string());
                break;
            }

            // Nenhuma regra acima deixa o span do mesmo tamanho; a guarda evita laço infinito
            if rest.chars().count() >= before {
                tokens.push(rest.to_string());
                break;
            }
        }

        detached.reverse();
        tokens.extend(detached);
        tokens
    }
}
