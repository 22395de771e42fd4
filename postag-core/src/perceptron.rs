//! # Averaged Perceptron (inferência)
//!
//! Classificador linear com pesos pré-treinados. O treino não faz parte deste
//! crate: os pesos chegam de uma fonte externa como três tabelas
//! ([`ModelData`]) e são achatados uma única vez num índice compacto.
//!
//! ## Layout em memória
//!
//! O mapa aninhado `feature → tag → peso` vira:
//! - `feature_index`: nome da feature → número da linha;
//! - `rows`: `row_offsets[r]..row_offsets[r + 1]` delimita a linha `r` em `entries`;
//! - `entries`: pares `(ClassId, peso)` contíguos.
//!
//! As classes são endereçadas por inteiro, então a pontuação é um vetor denso.
//!
//! ## Desempate
//!
//! Com pontuações iguais vence a tag **lexicograficamente menor**. Tags
//! ausentes de todas as linhas tocadas pontuam 0 e continuam candidatas.
//!
//! O modelo é imutável depois de construído: `predict` não tem efeitos
//! colaterais e pode ser chamado de várias threads ao mesmo tempo.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PosError, Result};
use crate::features::FeatureVector;

/// Índice de uma classe (tag) no modelo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// As três tabelas externas que descrevem um modelo treinado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    /// Conjunto ordenado de tags.
    pub classes: Vec<String>,
    /// feature → tag → peso.
    pub weights: HashMap<String, HashMap<String, f64>>,
    /// Palavra exata → tag fixa (tabela de exceções).
    #[serde(default, alias = "tagMap")]
    pub tags: HashMap<String, String>,
}

/// Modelo Perceptron Médio, somente leitura.
#[derive(Debug, Clone)]
pub struct PerceptronModel {
    /// Tags na ordem declarada (sem duplicatas).
    classes: Vec<String>,
    /// Classes ordenadas pelo rótulo, usadas no desempate.
    ranked: Vec<ClassId>,
    feature_index: HashMap<String, u32>,
    row_offsets: Vec<usize>,
    entries: Vec<(ClassId, f64)>,
    exceptions: HashMap<String, String>,
}

impl PerceptronModel {
    /// Constrói o modelo a partir das tabelas externas.
    ///
    /// Falha se `classes` estiver vazio ou se algum peso referenciar uma tag
    /// fora de `classes`.
    pub fn new(
        classes: Vec<String>,
        weights: HashMap<String, HashMap<String, f64>>,
        exceptions: HashMap<String, String>,
    ) -> Result<Self> {
        let mut unique = Vec::with_capacity(classes.len());
        let mut class_index: HashMap<String, ClassId> = HashMap::with_capacity(classes.len());
        for label in classes {
            if !class_index.contains_key(&label) {
                class_index.insert(label.clone(), ClassId(unique.len() as u32));
                unique.push(label);
            }
        }
        if unique.is_empty() {
            return Err(PosError::EmptyClasses);
        }

        let mut ranked: Vec<ClassId> = (0..unique.len() as u32).map(ClassId).collect();
        ranked.sort_by(|a, b| unique[a.index()].cmp(&unique[b.index()]));

        // Ordena as features para que o índice seja o mesmo a cada carga
        let mut rows: Vec<(String, HashMap<String, f64>)> = weights.into_iter().collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let mut feature_index = HashMap::with_capacity(rows.len());
        let mut row_offsets = Vec::with_capacity(rows.len() + 1);
        let mut entries = Vec::new();
        row_offsets.push(0);

        for (feature, row) in rows {
            let mut cells = Vec::with_capacity(row.len());
            for (label, weight) in row {
                let Some(&id) = class_index.get(&label) else {
                    return Err(PosError::UnknownLabel { feature, label });
                };
                cells.push((id, weight));
            }
            cells.sort_by_key(|(id, _)| *id);
            entries.extend(cells);
            feature_index.insert(feature, (row_offsets.len() - 1) as u32);
            row_offsets.push(entries.len());
        }

        info!(
            classes = unique.len(),
            features = feature_index.len(),
            weights = entries.len(),
            exceptions = exceptions.len(),
            "modelo perceptron carregado"
        );

        Ok(Self {
            classes: unique,
            ranked,
            feature_index,
            row_offsets,
            entries,
            exceptions,
        })
    }

    pub fn from_data(data: ModelData) -> Result<Self> {
        Self::new(data.classes, data.weights, data.tags)
    }

    /// Lê o modelo de um JSON `{classes, weights, tags}`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let data: ModelData = serde_json::from_reader(reader)?;
        Self::from_data(data)
    }

    /// Carrega o modelo de um arquivo JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Tag fixa para a palavra exata (sensível a maiúsculas), se houver.
    pub fn exception(&self, word: &str) -> Option<&str> {
        self.exceptions.get(word).map(String::as_str)
    }

    pub fn num_features(&self) -> usize {
        self.feature_index.len()
    }

    /// Linha de pesos de uma feature.
    fn row(&self, feature: &str) -> Option<&[(ClassId, f64)]> {
        let r = *self.feature_index.get(feature)? as usize;
        Some(&self.entries[self.row_offsets[r]..self.row_offsets[r + 1]])
    }

    /// Pontuação densa: `score[c] = Σ contagem × peso[feature][c]`.
    fn score_vector(&self, features: &FeatureVector) -> Vec<f64> {
        let mut scores = vec![0.0; self.classes.len()];
        for (feature, count) in features.iter() {
            if count == 0.0 {
                continue;
            }
            if let Some(row) = self.row(feature) {
                for &(class, weight) in row {
                    scores[class.index()] += count * weight;
                }
            }
        }
        scores
    }

    /// Prediz a tag de maior pontuação.
    pub fn predict(&self, features: &FeatureVector) -> &str {
        let scores = self.score_vector(features);
        // `ranked` está em ordem lexicográfica: com empate, o primeiro visto vence
        let mut best = self.ranked[0];
        for &class in &self.ranked[1..] {
            if scores[class.index()] > scores[best.index()] {
                best = class;
            }
        }
        &self.classes[best.index()]
    }

    /// Todas as tags com sua pontuação, em ordem lexicográfica.
    pub fn scores(&self, features: &FeatureVector) -> Vec<(&str, f64)> {
        let scores = self.score_vector(features);
        self.ranked
            .iter()
            .map(|c| (self.classes[c.index()].as_str(), scores[c.index()]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(keys: &[&str]) -> FeatureVector {
        let mut fv = FeatureVector::new();
        for key in keys {
            fv.add(&[*key]);
        }
        fv
    }

    fn weights(rows: &[(&str, &[(&str, f64)])]) -> HashMap<String, HashMap<String, f64>> {
        rows.iter()
            .map(|(feature, row)| {
                let row = row.iter().map(|(l, w)| (l.to_string(), *w)).collect();
                (feature.to_string(), row)
            })
            .collect()
    }

    fn classes(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_predict_sums_weights() {
        let model = PerceptronModel::new(
            classes(&["NN", "VB", "DT"]),
            weights(&[
                ("bias", &[("NN", 1.0), ("VB", 0.5)]),
                ("i word run", &[("VB", 2.0), ("NN", 0.25)]),
            ]),
            HashMap::new(),
        )
        .unwrap();

        assert_eq!(model.predict(&fv(&["bias"])), "NN");
        assert_eq!(model.predict(&fv(&["bias", "i word run"])), "VB");

        let scores = model.scores(&fv(&["bias", "i word run"]));
        assert_eq!(scores, vec![("DT", 0.0), ("NN", 1.25), ("VB", 2.5)]);
    }

    #[test]
    fn test_counts_multiply_weights() {
        let model = PerceptronModel::new(
            classes(&["A", "B"]),
            weights(&[("x", &[("A", 1.0)]), ("y", &[("B", 1.5)])]),
            HashMap::new(),
        )
        .unwrap();

        let mut features = fv(&["y"]);
        features.add(&["x"]);
        features.add(&["x"]);
        // 2 × 1.0 > 1.5
        assert_eq!(model.predict(&features), "A");
    }

    #[test]
    fn test_zero_count_features_are_ignored() {
        let model = PerceptronModel::new(
            classes(&["A", "B"]),
            weights(&[("x", &[("B", 5.0)])]),
            HashMap::new(),
        )
        .unwrap();

        let mut features = FeatureVector::new();
        features.features.insert("x".to_string(), 0.0);
        assert_eq!(model.predict(&features), "A");
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        let model = PerceptronModel::new(
            classes(&["VB", "NN", "JJ"]),
            weights(&[("bias", &[("VB", 1.0), ("NN", 1.0)])]),
            HashMap::new(),
        )
        .unwrap();
        assert_eq!(model.predict(&fv(&["bias"])), "NN");
        // Sem nenhuma feature conhecida todas pontuam 0
        assert_eq!(model.predict(&fv(&["unknown"])), "JJ");
    }

    #[test]
    fn test_untouched_labels_remain_candidates() {
        let model = PerceptronModel::new(
            classes(&["NN", "VB"]),
            weights(&[("bias", &[("NN", -1.0)])]),
            HashMap::new(),
        )
        .unwrap();
        // VB não aparece na linha e pontua 0 > -1
        assert_eq!(model.predict(&fv(&["bias"])), "VB");
    }

    #[test]
    fn test_invalid_models_are_rejected() {
        let empty = PerceptronModel::new(vec![], HashMap::new(), HashMap::new());
        assert!(matches!(empty, Err(PosError::EmptyClasses)));

        let unknown = PerceptronModel::new(
            classes(&["NN"]),
            weights(&[("bias", &[("XX", 1.0)])]),
            HashMap::new(),
        );
        assert!(matches!(
            unknown,
            Err(PosError::UnknownLabel { ref label, .. }) if label == "XX"
        ));
    }

    #[test]
    fn test_duplicate_classes_are_merged() {
        let model =
            PerceptronModel::new(classes(&["NN", "VB", "NN"]), HashMap::new(), HashMap::new())
                .unwrap();
        assert_eq!(model.classes(), ["NN", "VB"]);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{
            "classes": ["DT", "NN"],
            "weights": {"i word the": {"DT": 3.0}},
            "tagMap": {"board": "NN"}
        }"#;
        let model = PerceptronModel::from_reader(json.as_bytes()).unwrap();

        assert_eq!(model.num_features(), 1);
        assert_eq!(model.exception("board"), Some("NN"));
        assert_eq!(model.exception("Board"), None);
        assert_eq!(model.predict(&fv(&["i word the"])), "DT");
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let result = PerceptronModel::from_reader(r#"{"classes": 3}"#.as_bytes());
        assert!(matches!(result, Err(PosError::Json(_))));

        let missing = PerceptronModel::load("/nonexistent/model.json");
        assert!(matches!(missing, Err(PosError::Io(_))));
    }
}
