use crate::document::Document;
use std::collections::{HashMap, HashSet};

/// Normalized term frequency: raw count per word divided by the total token
/// count. Empty input yields an empty map.
pub fn term_frequency(words: &[String]) -> HashMap<String, f64> {
    let mut tf = HashMap::new();
    if words.is_empty() {
        return tf;
    }

    for word in words {
        *tf.entry(word.clone()).or_insert(0.0) += 1.0;
    }

    let total = words.len() as f64;
    for frequency in tf.values_mut() {
        *frequency /= total;
    }

    tf
}

/// Inverse document frequency for every word in the vocabulary:
/// `idf(word) = ln(N / (df + 1))` with `N` the document count and `df` the
/// number of documents containing the word.
///
/// Always recomputed from scratch over the whole corpus; incremental updates
/// would let vectors drift from the table.
pub fn inverse_document_frequency(
    documents: &[Document],
    vocabulary: &HashSet<String>,
) -> HashMap<String, f64> {
    let n = documents.len() as f64;

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        let unique: HashSet<&str> = doc.words.iter().map(String::as_str).collect();
        for word in unique {
            *document_frequency.entry(word).or_insert(0) += 1;
        }
    }

    vocabulary
        .iter()
        .map(|word| {
            let df = document_frequency.get(word.as_str()).copied().unwrap_or(0) as f64;
            (word.clone(), (n / (df + 1.0)).ln())
        })
        .collect()
}

/// TF-IDF weights for the words present in `tf`. A word the corpus has never
/// seen carries no IDF entry and weighs zero.
pub fn tfidf_vector(
    tf: &HashMap<String, f64>,
    idf: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    tf.iter()
        .map(|(word, frequency)| {
            let weight = frequency * idf.get(word).copied().unwrap_or(0.0);
            (word.clone(), weight)
        })
        .collect()
}

/// Cosine similarity over the union of both vectors' words. Returns 0.0 when
/// either magnitude is zero, so empty or fully-unknown queries never divide
/// by zero.
pub fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let words: HashSet<&String> = a.keys().chain(b.keys()).collect();

    let mut dot_product = 0.0;
    let mut magnitude_a = 0.0;
    let mut magnitude_b = 0.0;

    for word in words {
        let weight_a = a.get(word).copied().unwrap_or(0.0);
        let weight_b = b.get(word).copied().unwrap_or(0.0);
        dot_product += weight_a * weight_b;
        magnitude_a += weight_a * weight_a;
        magnitude_b += weight_b * weight_b;
    }

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        0.0
    } else {
        dot_product / (magnitude_a.sqrt() * magnitude_b.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;

    fn doc(id: &str, words: &[&str]) -> Document {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        Document {
            id: id.to_string(),
            content: words.join(" "),
            original_content: words.join(" "),
            term_frequency: term_frequency(&words),
            words,
            vector: HashMap::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    #[test]
    fn test_term_frequency_sums_to_one() {
        let words: Vec<String> = ["the", "cat", "sat", "the"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let tf = term_frequency(&words);

        assert_eq!(tf.get("the"), Some(&0.5));
        assert_eq!(tf.get("cat"), Some(&0.25));
        let sum: f64 = tf.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_term_frequency_empty_input() {
        assert!(term_frequency(&[]).is_empty());
    }

    #[test]
    fn test_idf_formula() {
        let docs = vec![doc("1", &["cat", "sat"]), doc("2", &["dog", "sat"])];
        let vocabulary: HashSet<String> = ["cat", "dog", "sat"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let idf = inverse_document_frequency(&docs, &vocabulary);

        // df=1 out of 2 docs: ln(2/2) = 0
        assert!((idf["cat"] - 0.0).abs() < 1e-9);
        // df=2 out of 2 docs: ln(2/3) < 0
        assert!((idf["sat"] - (2.0f64 / 3.0).ln()).abs() < 1e-9);
    }

    #[test]
    fn test_idf_covers_whole_vocabulary() {
        let docs = vec![doc("1", &["alpha", "beta"])];
        let vocabulary: HashSet<String> =
            ["alpha", "beta"].iter().map(|w| w.to_string()).collect();
        let idf = inverse_document_frequency(&docs, &vocabulary);
        assert_eq!(idf.len(), vocabulary.len());
    }

    #[test]
    fn test_tfidf_vector_unknown_word_weighs_zero() {
        let mut tf = HashMap::new();
        tf.insert("known".to_string(), 0.5);
        tf.insert("unknown".to_string(), 0.5);
        let mut idf = HashMap::new();
        idf.insert("known".to_string(), 2.0);

        let vector = tfidf_vector(&tf, &idf);
        assert_eq!(vector.get("known"), Some(&1.0));
        assert_eq!(vector.get("unknown"), Some(&0.0));
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let mut v = HashMap::new();
        v.insert("cat".to_string(), 0.3);
        v.insert("mat".to_string(), 0.7);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_disjoint_vectors() {
        let mut a = HashMap::new();
        a.insert("cat".to_string(), 1.0);
        let mut b = HashMap::new();
        b.insert("dog".to_string(), 1.0);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_zero_magnitude() {
        let empty = HashMap::new();
        let mut b = HashMap::new();
        b.insert("dog".to_string(), 1.0);
        assert_eq!(cosine_similarity(&empty, &b), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
    }
}
