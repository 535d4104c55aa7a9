use tracing::instrument;

use crate::domain::{
    ports::SentenceEncoder, CompareError, DomainError, Embedding, Matrix, ModelDescriptor,
    SimilarityResult,
};

/// Pairwise cosine similarity. Only the upper triangle is computed and mirrored,
/// so the result is exactly symmetric.
pub fn cosine_similarity_matrix(embeddings: &[Embedding]) -> Matrix {
    pairwise(embeddings, |a, b| a.cosine_similarity(b))
}

/// Pairwise Euclidean distance between the L2-normalized embeddings.
pub fn normalized_euclidean_distance_matrix(embeddings: &[Embedding]) -> Matrix {
    let normalized: Vec<Embedding> = embeddings.iter().map(Embedding::l2_normalized).collect();
    pairwise(&normalized, |a, b| a.euclidean_distance(b))
}

fn pairwise(embeddings: &[Embedding], metric: impl Fn(&Embedding, &Embedding) -> f32) -> Matrix {
    let n = embeddings.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in i..n {
            let value = metric(&embeddings[i], &embeddings[j]);
            matrix[i][j] = value;
            matrix[j][i] = value;
        }
    }

    matrix
}

/// Encodes `sentences` with one model and derives both similarity matrices.
///
/// The reported dimension is the catalog's, whatever width the encoder emits.
#[instrument(skip(sentences, encoder), fields(model = %model.name, count = sentences.len()))]
pub async fn compare(
    sentences: &[String],
    encoder: &dyn SentenceEncoder,
    model: &ModelDescriptor,
) -> Result<SimilarityResult, CompareError> {
    let embeddings = encoder
        .encode(sentences)
        .await
        .map_err(|e| CompareError::processing(&model.name, e))?;

    if embeddings.len() != sentences.len() {
        return Err(CompareError::processing(
            &model.name,
            DomainError::encoding(format!(
                "expected {} embeddings, got {}",
                sentences.len(),
                embeddings.len()
            )),
        ));
    }

    Ok(SimilarityResult {
        model_name: model.name.clone(),
        dimension: model.dimension,
        cosine_similarity: cosine_similarity_matrix(&embeddings),
        normalized_euclidean_distance: normalized_euclidean_distance_matrix(&embeddings),
    })
}
