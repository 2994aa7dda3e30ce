//! Inference-only LSTM regressor
//!
//! Weights are read from a JSON export of a trained network made of stacked
//! LSTM layers followed by linear dense layers ending in a single unit. The
//! tensor layout follows Keras: an LSTM `kernel` is `(input_dim, 4 * units)`,
//! `recurrent_kernel` is `(units, 4 * units)` and `bias` is `4 * units`, with
//! gates ordered input, forget, cell, output.
//!
//! ```json
//! {
//!   "window_size": 60,
//!   "lstm": [{"kernel": [[...]], "recurrent_kernel": [[...]], "bias": [...]}],
//!   "dense": [{"kernel": [[...]], "bias": [...]}]
//! }
//! ```

use super::error::ModelError;
use super::model::{OneStepModel, check_window};
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Serialized weights of one LSTM layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmLayerWeights {
    pub kernel: Vec<Vec<f64>>,
    pub recurrent_kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Serialized weights of one dense layer (linear activation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayerWeights {
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// On-disk model description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmWeights {
    pub window_size: usize,
    pub lstm: Vec<LstmLayerWeights>,
    pub dense: Vec<DenseLayerWeights>,
}

#[derive(Debug, Clone)]
struct LstmLayer {
    units: usize,
    kernel: Array2<f64>,
    recurrent_kernel: Array2<f64>,
    bias: Array1<f64>,
}

#[derive(Debug, Clone)]
struct DenseLayer {
    kernel: Array2<f64>,
    bias: Array1<f64>,
}

/// Stacked LSTM network producing one normalized value per window
#[derive(Debug, Clone)]
pub struct LstmModel {
    window_size: usize,
    lstm: Vec<LstmLayer>,
    dense: Vec<DenseLayer>,
}

fn to_matrix(rows: &[Vec<f64>], what: &str) -> Result<Array2<f64>, ModelError> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if n_rows == 0 || n_cols == 0 {
        return Err(ModelError::Weights(format!("{what} is empty")));
    }
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(ModelError::Weights(format!("{what} has ragged rows")));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| ModelError::Weights(format!("{what}: {e}")))
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl LstmModel {
    /// Validate shapes and build the network
    pub fn from_weights(weights: LstmWeights) -> Result<Self, ModelError> {
        if weights.window_size == 0 {
            return Err(ModelError::Weights("window_size must be positive".to_string()));
        }
        if weights.lstm.is_empty() {
            return Err(ModelError::Weights("at least one LSTM layer is required".to_string()));
        }

        let mut input_dim = 1;
        let mut lstm = Vec::with_capacity(weights.lstm.len());
        for (i, layer) in weights.lstm.iter().enumerate() {
            let kernel = to_matrix(&layer.kernel, &format!("lstm[{i}].kernel"))?;
            let recurrent_kernel =
                to_matrix(&layer.recurrent_kernel, &format!("lstm[{i}].recurrent_kernel"))?;
            let units = recurrent_kernel.nrows();

            if kernel.dim() != (input_dim, 4 * units)
                || recurrent_kernel.dim() != (units, 4 * units)
                || layer.bias.len() != 4 * units
            {
                return Err(ModelError::Weights(format!(
                    "lstm[{i}] shapes do not match input_dim={input_dim}, units={units}"
                )));
            }

            lstm.push(LstmLayer {
                units,
                kernel,
                recurrent_kernel,
                bias: Array1::from(layer.bias.clone()),
            });
            input_dim = units;
        }

        let mut dense = Vec::with_capacity(weights.dense.len());
        for (i, layer) in weights.dense.iter().enumerate() {
            let kernel = to_matrix(&layer.kernel, &format!("dense[{i}].kernel"))?;
            if kernel.nrows() != input_dim || layer.bias.len() != kernel.ncols() {
                return Err(ModelError::Weights(format!(
                    "dense[{i}] shapes do not match input_dim={input_dim}"
                )));
            }
            input_dim = kernel.ncols();
            dense.push(DenseLayer {
                kernel,
                bias: Array1::from(layer.bias.clone()),
            });
        }

        if input_dim != 1 {
            return Err(ModelError::Weights(format!(
                "network must end in a single output, got {input_dim}"
            )));
        }

        Ok(Self {
            window_size: weights.window_size,
            lstm,
            dense,
        })
    }

    /// Load weights from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let weights: LstmWeights = serde_json::from_str(&raw)?;
        let model = Self::from_weights(weights)?;
        info!(
            path = %path.display(),
            layers = model.lstm.len(),
            window = model.window_size,
            "Loaded LSTM model"
        );
        Ok(model)
    }

    /// Run one LSTM layer over a sequence, returning every hidden state
    fn run_layer(layer: &LstmLayer, inputs: &[Array1<f64>]) -> Vec<Array1<f64>> {
        let u = layer.units;
        let mut h = Array1::<f64>::zeros(u);
        let mut c = Array1::<f64>::zeros(u);
        let mut outputs = Vec::with_capacity(inputs.len());

        for x in inputs {
            let z = x.dot(&layer.kernel) + h.dot(&layer.recurrent_kernel) + &layer.bias;

            let i = z.slice(s![0..u]).mapv(sigmoid);
            let f = z.slice(s![u..2 * u]).mapv(sigmoid);
            let g = z.slice(s![2 * u..3 * u]).mapv(f64::tanh);
            let o = z.slice(s![3 * u..4 * u]).mapv(sigmoid);

            c = &f * &c + &i * &g;
            h = &o * &c.mapv(f64::tanh);
            outputs.push(h.clone());
        }

        outputs
    }
}

impl OneStepModel for LstmModel {
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError> {
        check_window(window, self.window_size)?;

        let mut sequence: Vec<Array1<f64>> =
            window.iter().map(|&v| Array1::from(vec![v])).collect();
        for layer in &self.lstm {
            sequence = Self::run_layer(layer, &sequence);
        }

        // Only the final hidden state feeds the dense head
        let mut out = sequence
            .pop()
            .ok_or_else(|| ModelError::Weights("empty sequence".to_string()))?;
        for layer in &self.dense {
            out = out.dot(&layer.kernel) + &layer.bias;
        }

        let value = out[0];
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFinite(value))
        }
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn name(&self) -> &'static str {
        "lstm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_unit(window_size: usize, kernel: [f64; 4], dense_bias: f64) -> LstmWeights {
        LstmWeights {
            window_size,
            lstm: vec![LstmLayerWeights {
                kernel: vec![kernel.to_vec()],
                recurrent_kernel: vec![vec![0.0; 4]],
                bias: vec![0.0; 4],
            }],
            dense: vec![DenseLayerWeights {
                kernel: vec![vec![1.0]],
                bias: vec![dense_bias],
            }],
        }
    }

    #[test]
    fn test_hand_computed_forward_pass() {
        let model = LstmModel::from_weights(single_unit(2, [0.0, 0.0, 1.0, 0.0], 0.0)).unwrap();

        // Gates sit at sigmoid(0) = 0.5; only the cell candidate sees the input
        let x: f64 = 0.5;
        let c1 = 0.5 * x.tanh();
        let c2 = 0.5 * c1 + 0.5 * x.tanh();
        let expected = 0.5 * c2.tanh();

        let value = model.predict(&[x, x]).unwrap();
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weights_return_dense_bias() {
        let mut weights = single_unit(60, [0.0; 4], 0.25);
        weights.dense[0].kernel = vec![vec![0.0]];
        let model = LstmModel::from_weights(weights).unwrap();

        assert_eq!(model.predict(&[0.3; 60]).unwrap(), 0.25);
        assert_eq!(model.window_size(), 60);
    }

    #[test]
    fn test_stacked_layers_and_dense_head() {
        let weights = LstmWeights {
            window_size: 3,
            lstm: vec![
                LstmLayerWeights {
                    kernel: vec![vec![0.1; 8]],
                    recurrent_kernel: vec![vec![0.2; 8]; 2],
                    bias: vec![0.0; 8],
                },
                LstmLayerWeights {
                    kernel: vec![vec![0.3; 4]; 2],
                    recurrent_kernel: vec![vec![0.1; 4]],
                    bias: vec![0.0; 4],
                },
            ],
            dense: vec![
                DenseLayerWeights {
                    kernel: vec![vec![1.0, -1.0]],
                    bias: vec![0.0, 0.0],
                },
                DenseLayerWeights {
                    kernel: vec![vec![1.0], vec![1.0]],
                    bias: vec![0.5],
                },
            ],
        };
        let model = LstmModel::from_weights(weights).unwrap();

        // The two dense branches cancel, leaving the final bias
        let value = model.predict(&[0.1, 0.2, 0.3]).unwrap();
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_validation() {
        let mut weights = single_unit(60, [0.0; 4], 0.0);
        weights.lstm[0].bias = vec![0.0; 3];
        assert!(matches!(
            LstmModel::from_weights(weights),
            Err(ModelError::Weights(_))
        ));

        let mut weights = single_unit(60, [0.0; 4], 0.0);
        weights.dense[0].kernel = vec![vec![1.0, 1.0]];
        weights.dense[0].bias = vec![0.0, 0.0];
        assert!(matches!(
            LstmModel::from_weights(weights),
            Err(ModelError::Weights(_))
        ));
    }

    #[test]
    fn test_wrong_window_length() {
        let model = LstmModel::from_weights(single_unit(60, [0.0; 4], 0.0)).unwrap();
        assert!(matches!(
            model.predict(&[0.0; 10]),
            Err(ModelError::WindowSize { expected: 60, actual: 10 })
        ));
    }

    #[test]
    fn test_load_from_json() {
        let path = std::env::temp_dir().join(format!("vision-lstm-{}.json", std::process::id()));
        let json = serde_json::to_string(&single_unit(60, [0.0; 4], 0.1)).unwrap();
        std::fs::write(&path, json).unwrap();

        let model = LstmModel::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(model.name(), "lstm");
        assert!(model.predict(&[0.5; 60]).is_ok());
    }
}
