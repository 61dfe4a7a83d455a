use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig},
    prelude::*,
    tensor::{activation, TensorData},
};
use std::collections::HashMap;

use crate::ml::error::{GuesserError, GuesserResult};
use crate::ml::spatial::SPATIAL_DIM;

// #[derive(Config)] brings Clone and serde with it; do not derive them again.
#[derive(Config, Debug)]
pub struct GuesserConfig {
    /// Width of the dialogue encoder's hidden state
    pub hidden_encoder_dim:   usize,
    /// Rows of the category embedding table (`1 + max category id`)
    pub category_count:       usize,
    pub object_embedding_dim: usize,
    #[config(default = 64)]
    pub mlp_hidden_dim:       usize,
}

impl GuesserConfig {
    /// Build the Guesser with fresh parameters on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Guesser<B> {
        let object_embeddings = EmbeddingConfig::new(self.category_count, self.object_embedding_dim)
            .init(device);
        let mlp_in  = LinearConfig::new(SPATIAL_DIM + self.object_embedding_dim, self.mlp_hidden_dim)
            .init(device);
        let mlp_out = LinearConfig::new(self.mlp_hidden_dim, self.hidden_encoder_dim).init(device);
        Guesser {
            object_embeddings,
            mlp_in,
            mlp_out,
            hidden_encoder_dim: self.hidden_encoder_dim,
            category_count:     self.category_count,
        }
    }
}

/// Scores candidate objects against a dialogue hidden state.
///
/// Each object is described by its 8-wide spatial vector and a learned
/// category embedding. The concatenation goes through
/// `Linear → ReLU → Linear` into the hidden-state space, and the dot
/// product with the hidden state is the object's logit.
#[derive(Module, Debug)]
pub struct Guesser<B: Backend> {
    pub object_embeddings:  Embedding<B>,
    pub mlp_in:             Linear<B>,
    pub mlp_out:            Linear<B>,
    pub hidden_encoder_dim: usize,
    pub category_count:     usize,
}

impl<B: Backend> Guesser<B> {
    /// spatial: [n, 8], categories: [n] → [n, hidden_encoder_dim]
    pub fn proposed_embeddings(
        &self,
        spatial:    Tensor<B, 2>,
        categories: Tensor<B, 1, Int>,
    ) -> Tensor<B, 2> {
        let [n] = categories.dims();
        let embedded = self.object_embeddings.forward(categories.reshape([1, n])); // [1, n, d]
        let [_, _, d] = embedded.dims();
        let mlp_input = Tensor::cat(vec![spatial, embedded.reshape([n, d])], 1);
        self.mlp_out.forward(activation::relu(self.mlp_in.forward(mlp_input)))
    }

    /// Log-probabilities over the `n` candidates.
    ///
    /// hidden: [batch, hidden_encoder_dim], only row 0 is used
    /// spatial: [n, 8], categories: [n] → [n]
    pub fn forward(
        &self,
        hidden:     Tensor<B, 2>,
        spatial:    Tensor<B, 2>,
        categories: Tensor<B, 1, Int>,
    ) -> GuesserResult<Tensor<B, 1>> {
        let [rows, width] = spatial.dims();
        let [n]           = categories.dims();
        if n != rows {
            return Err(GuesserError::ShapeMismatch { categories: n, rows });
        }
        if rows == 0 {
            return Err(GuesserError::NoCandidates);
        }
        if width != SPATIAL_DIM {
            return Err(GuesserError::SpatialWidth { expected: SPATIAL_DIM, got: width });
        }
        let [batch, hidden_dim] = hidden.dims();
        if batch == 0 {
            return Err(GuesserError::EmptyHiddenState);
        }
        if hidden_dim != self.hidden_encoder_dim {
            return Err(GuesserError::HiddenDim { expected: self.hidden_encoder_dim, got: hidden_dim });
        }

        self.check_category_ids(&categories)?;

        let proposed = self.proposed_embeddings(spatial, categories);
        let query    = hidden.slice([0..1, 0..hidden_dim]);
        let logits   = proposed.matmul(query.transpose()).reshape([1, n]);
        Ok(activation::log_softmax(logits, 1).reshape([n]))
    }

    /// Every id must address a row of the embedding table.
    fn check_category_ids(&self, categories: &Tensor<B, 1, Int>) -> GuesserResult<()> {
        let ids = categories
            .clone()
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| GuesserError::TensorData(format!("{e:?}")))?;
        match ids.into_iter().find(|&id| id < 0 || id as usize >= self.category_count) {
            Some(id) => Err(GuesserError::CategoryOutOfRange { id, count: self.category_count }),
            None     => Ok(()),
        }
    }

    /// Negative log-likelihood of the candidate at position `target`. Shape [1].
    pub fn forward_loss(
        &self,
        hidden:     Tensor<B, 2>,
        spatial:    Tensor<B, 2>,
        categories: Tensor<B, 1, Int>,
        target:     usize,
    ) -> GuesserResult<Tensor<B, 1>> {
        let log_probs = self.forward(hidden, spatial, categories)?;
        let [n] = log_probs.dims();
        if target >= n {
            return Err(GuesserError::TargetOutOfRange { target, candidates: n });
        }
        Ok(log_probs.slice([target..target + 1]).neg())
    }

    /// `[category_count]` vector with a single 1 at the category's id.
    pub fn category_one_hot(
        &self,
        cat2id: &HashMap<String, i64>,
        name:   &str,
        device: &B::Device,
    ) -> GuesserResult<Tensor<B, 1>> {
        let id = *cat2id
            .get(name)
            .ok_or_else(|| GuesserError::UnknownCategory(name.to_string()))?;
        if id < 0 || id as usize >= self.category_count {
            return Err(GuesserError::CategoryOutOfRange { id, count: self.category_count });
        }
        let mut onehot = vec![0.0f32; self.category_count];
        onehot[id as usize] = 1.0;
        Ok(Tensor::from_data(TensorData::new(onehot, [self.category_count]), device))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    const HIDDEN: usize = 16;

    fn guesser(device: &<TestBackend as Backend>::Device) -> Guesser<TestBackend> {
        GuesserConfig::new(HIDDEN, 6, 4).init(device)
    }

    fn inputs(
        n: usize,
        device: &<TestBackend as Backend>::Device,
    ) -> (Tensor<TestBackend, 2>, Tensor<TestBackend, 2>, Tensor<TestBackend, 1, Int>) {
        let hidden  = Tensor::random([2, HIDDEN], Distribution::Default, device);
        let spatial = Tensor::random([n, SPATIAL_DIM], Distribution::Uniform(-1.0, 1.0), device);
        let ids: Vec<i32> = (0..n).map(|i| (i % 6) as i32).collect();
        let categories = Tensor::<TestBackend, 1, Int>::from_ints(ids.as_slice(), device);
        (hidden, spatial, categories)
    }

    #[test]
    fn test_default_mlp_width() {
        let cfg = GuesserConfig::new(HIDDEN, 6, 4);
        assert_eq!(cfg.mlp_hidden_dim, 64);
        assert_eq!(cfg.with_mlp_hidden_dim(32).mlp_hidden_dim, 32);
    }

    #[test]
    fn test_proposed_embedding_shape() {
        let device = Default::default();
        let model  = guesser(&device);
        let (_, spatial, categories) = inputs(5, &device);
        assert_eq!(model.proposed_embeddings(spatial, categories).dims(), [5, HIDDEN]);
    }

    #[test]
    fn test_scores_form_a_distribution() {
        let device = Default::default();
        let model  = guesser(&device);
        for n in [1, 3, 7] {
            let (hidden, spatial, categories) = inputs(n, &device);
            let scores = model.forward(hidden, spatial, categories).unwrap();
            let values = scores.into_data().to_vec::<f32>().unwrap();
            assert_eq!(values.len(), n);
            let total: f32 = values.iter().map(|v| v.exp()).sum();
            assert!((total - 1.0).abs() < 1e-4, "sum of probabilities = {total}");
            assert!(values.iter().all(|&v| v <= 1e-6));
        }
    }

    #[test]
    fn test_single_candidate_is_certain() {
        let device = Default::default();
        let model  = guesser(&device);
        let (hidden, spatial, categories) = inputs(1, &device);
        let values = model.forward(hidden, spatial, categories).unwrap()
            .into_data().to_vec::<f32>().unwrap();
        assert!(values[0].abs() < 1e-6);
    }

    #[test]
    fn test_only_first_hidden_row_is_used() {
        let device = Default::default();
        let model  = guesser(&device);
        let (hidden, spatial, categories) = inputs(4, &device);

        let first_row = hidden.clone().slice([0..1, 0..HIDDEN]);
        let a = model.forward(hidden, spatial.clone(), categories.clone()).unwrap()
            .into_data().to_vec::<f32>().unwrap();
        let b = model.forward(first_row, spatial, categories).unwrap()
            .into_data().to_vec::<f32>().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_category_count_must_match_rows() {
        let device = Default::default();
        let model  = guesser(&device);
        let (hidden, spatial, _) = inputs(3, &device);
        let categories = Tensor::<TestBackend, 1, Int>::from_ints([1i32, 2].as_slice(), &device);
        assert!(matches!(
            model.forward(hidden, spatial, categories),
            Err(GuesserError::ShapeMismatch { categories: 2, rows: 3 })
        ));
    }

    #[test]
    fn test_category_id_outside_table() {
        let device = Default::default();
        let model  = guesser(&device);
        let (hidden, spatial, _) = inputs(2, &device);
        for ids in [[1i32, 7], [-1, 2]] {
            let categories = Tensor::<TestBackend, 1, Int>::from_ints(ids.as_slice(), &device);
            assert!(matches!(
                model.forward(hidden.clone(), spatial.clone(), categories),
                Err(GuesserError::CategoryOutOfRange { count: 6, .. })
            ));
        }
        // Last row of the table is still valid
        let categories = Tensor::<TestBackend, 1, Int>::from_ints([0i32, 5].as_slice(), &device);
        assert!(model.forward(hidden, spatial, categories).is_ok());
    }

    #[test]
    fn test_hidden_width_checked() {
        let device = Default::default();
        let model  = guesser(&device);
        let (_, spatial, categories) = inputs(3, &device);
        let hidden = Tensor::<TestBackend, 2>::zeros([1, HIDDEN + 1], &device);
        assert!(matches!(
            model.forward(hidden, spatial, categories),
            Err(GuesserError::HiddenDim { expected: HIDDEN, got: 17 })
        ));
    }

    #[test]
    fn test_spatial_width_checked() {
        let device = Default::default();
        let model  = guesser(&device);
        let (hidden, _, categories) = inputs(2, &device);
        let spatial = Tensor::<TestBackend, 2>::zeros([2, 5], &device);
        assert!(matches!(
            model.forward(hidden, spatial, categories),
            Err(GuesserError::SpatialWidth { expected: 8, got: 5 })
        ));
    }

    #[test]
    fn test_loss_is_negative_log_probability() {
        let device = Default::default();
        let model  = guesser(&device);
        let (hidden, spatial, categories) = inputs(4, &device);

        let scores = model.forward(hidden.clone(), spatial.clone(), categories.clone()).unwrap()
            .into_data().to_vec::<f32>().unwrap();
        let loss = model.forward_loss(hidden.clone(), spatial.clone(), categories.clone(), 2).unwrap()
            .into_data().to_vec::<f32>().unwrap();
        assert_eq!(loss.len(), 1);
        assert!(loss[0] >= 0.0);
        assert!((loss[0] + scores[2]).abs() < 1e-6);

        assert!(matches!(
            model.forward_loss(hidden, spatial, categories, 4),
            Err(GuesserError::TargetOutOfRange { target: 4, candidates: 4 })
        ));
    }

    #[test]
    fn test_category_one_hot() {
        let device = Default::default();
        let model  = guesser(&device);
        let cat2id: HashMap<String, i64> =
            [("bicycle".to_string(), 2), ("airplane".to_string(), 5), ("zebra".to_string(), 24)]
                .into_iter()
                .collect();

        let v = model.category_one_hot(&cat2id, "airplane", &device).unwrap()
            .into_data().to_vec::<f32>().unwrap();
        assert_eq!(v, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            model.category_one_hot(&cat2id, "unicorn", &device),
            Err(GuesserError::UnknownCategory(_))
        ));
        assert!(matches!(
            model.category_one_hot(&cat2id, "zebra", &device),
            Err(GuesserError::CategoryOutOfRange { id: 24, count: 6 })
        ));
    }
}
