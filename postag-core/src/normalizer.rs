//! # Normalização de Palavras
//!
//! Converte um token cru na **chave** usada para consultar features.
//! Palavras raras com a mesma "forma" colapsam numa única classe:
//!
//! | Entrada      | Chave      |
//! |--------------|------------|
//! | `well-known` | `!HYPHEN`  |
//! | `1999`       | `!YEAR`    |
//! | `3D`         | `!DIGITS`  |
//! | `Hello`      | `hello`    |
//!
//! A chave nunca substitui o texto emitido do token.

/// Sentinela para palavras hifenizadas (ex: "well-known").
pub const HYPHEN: &str = "!HYPHEN";
/// Sentinela para inteiros de 4 caracteres (ex: "1999").
pub const YEAR: &str = "!YEAR";
/// Sentinela para palavras que começam com dígito (ex: "3D", "61").
pub const DIGITS: &str = "!DIGITS";

/// Normaliza uma palavra para consulta no modelo.
///
/// Ordem das regras:
/// 1. vazio → vazio;
/// 2. contém `-` e não começa com `-` → [`HYPHEN`];
/// 3. é inteiro e tem exatamente 4 caracteres → [`YEAR`];
/// 4. primeiro caractere é dígito → [`DIGITS`];
/// 5. caso contrário, a palavra em minúsculas.
pub fn normalize(word: &str) -> String {
    let Some(first) = word.chars().next() else {
        return String::new();
    };

    if word.contains('-') && first != '-' {
        HYPHEN.to_string()
    } else if word.len() == 4 && word.parse::<i64>().is_ok() {
        YEAR.to_string()
    } else if first.is_ascii_digit() {
        DIGITS.to_string()
    } else {
        word.to_lowercase()
    }
}
