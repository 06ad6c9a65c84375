//! Analytic layer graph: shape propagation, parameter and MAC counting.
//!
//! Models are described as trees of [Module] nodes whose leaves are [Layer]
//! descriptors. No weights are materialized; parameter counts and
//! multiply-accumulate counts are computed exactly from the layer hyper
//! parameters and the propagated input shape, the same arithmetic a
//! per-layer profiling hook would perform on a real forward pass.

use crate::errors::FlopscopeError;

/// Tensor shape, outermost dimension first. Images are (N, C, H, W),
/// token sequences are (N, T, D).
pub type Shape = Vec<usize>;

/// Element count of a shape.
pub fn numel(shape: &[usize]) -> u64 {
    shape.iter().map(|&d| d as u64).product()
}

/// Activation kind. Activations carry no parameters and are not counted
/// as multiply-accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Gelu,
}

/// A single analyzable layer. Input channel / feature counts are taken
/// from the incoming shape, so the same descriptor composes anywhere.
#[derive(Debug, Clone)]
pub enum Layer {
    /// 2D convolution over (N, C, H, W).
    Conv2d {
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
        groups: usize,
        bias: bool,
    },
    /// Batch normalization: weight + bias per channel.
    BatchNorm2d,
    /// Layer normalization over the last dimension.
    LayerNorm,
    Activation(Activation),
    /// 2D max pooling; no parameters, not counted as MACs.
    MaxPool2d { kernel: usize, stride: usize, padding: usize },
    /// Global average pooling: (N, C, H, W) -> (N, C).
    GlobalAvgPool2d,
    /// (N, C, H, W) -> (N, C*H*W).
    Flatten,
    /// Fully connected layer over the last dimension.
    Linear { out_features: usize, bias: bool },
    /// Conv-style patch embedding with class token and learned position
    /// embedding: (N, C, H, W) -> (N, H*W/patch^2 + 1, dim).
    PatchEmbed { patch: usize, dim: usize },
    /// Multi-head self-attention over (N, T, D): QKV and output
    /// projections plus the two (T x T) attention matmuls.
    MultiHeadAttention { heads: usize },
    /// Take the class token: (N, T, D) -> (N, D).
    ClsPool,
    /// Elementwise residual add, emitted by [Module::Residual].
    Add,
}

impl Layer {
    /// Operator name used for per-operator cost breakdowns.
    pub fn op_name(&self) -> &'static str {
        match self {
            Layer::Conv2d { .. } => "conv",
            Layer::BatchNorm2d => "batchnorm",
            Layer::LayerNorm => "layernorm",
            Layer::Activation(_) => "activation",
            Layer::MaxPool2d { .. } | Layer::GlobalAvgPool2d | Layer::ClsPool => "pool",
            Layer::Flatten => "flatten",
            Layer::Linear { .. } => "linear",
            Layer::PatchEmbed { .. } => "patch_embed",
            Layer::MultiHeadAttention { .. } => "attention",
            Layer::Add => "add",
        }
    }

    fn mismatch(&self, expected: &str, actual: &[usize]) -> FlopscopeError {
        FlopscopeError::ShapeMismatch {
            layer: self.op_name().to_string(),
            expected: expected.to_string(),
            actual: format!("{:?}", actual),
        }
    }

    /// Output shape for the given input shape.
    pub fn output_shape(&self, input: &Shape) -> Result<Shape, FlopscopeError> {
        match *self {
            Layer::Conv2d {
                out_channels,
                kernel,
                stride,
                padding,
                groups,
                ..
            } => {
                let [n, c, h, w] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                if c % groups != 0 || h + 2 * padding < kernel || w + 2 * padding < kernel {
                    return Err(self.mismatch("channels divisible by groups, spatial >= kernel", input));
                }
                let oh = (h + 2 * padding - kernel) / stride + 1;
                let ow = (w + 2 * padding - kernel) / stride + 1;
                Ok(vec![n, out_channels, oh, ow])
            }
            Layer::MaxPool2d { kernel, stride, padding } => {
                let [n, c, h, w] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                if h + 2 * padding < kernel || w + 2 * padding < kernel {
                    return Err(self.mismatch("spatial >= kernel", input));
                }
                let oh = (h + 2 * padding - kernel) / stride + 1;
                let ow = (w + 2 * padding - kernel) / stride + 1;
                Ok(vec![n, c, oh, ow])
            }
            Layer::BatchNorm2d => {
                dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                Ok(input.clone())
            }
            Layer::GlobalAvgPool2d => {
                let [n, c, _, _] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                Ok(vec![n, c])
            }
            Layer::Flatten => {
                let [n, c, h, w] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                Ok(vec![n, c * h * w])
            }
            Layer::Linear { out_features, .. } => {
                if input.len() < 2 {
                    return Err(self.mismatch("(..., in_features)", input));
                }
                let mut out = input.clone();
                *out.last_mut().unwrap() = out_features;
                Ok(out)
            }
            Layer::LayerNorm | Layer::Activation(_) => {
                if input.is_empty() {
                    return Err(self.mismatch("non-empty shape", input));
                }
                Ok(input.clone())
            }
            Layer::PatchEmbed { patch, dim } => {
                let [n, _, h, w] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                if h % patch != 0 || w % patch != 0 {
                    return Err(self.mismatch("spatial divisible by patch size", input));
                }
                let tokens = (h / patch) * (w / patch) + 1;
                Ok(vec![n, tokens, dim])
            }
            Layer::MultiHeadAttention { heads } => {
                let [_, _, d] = dims3(input).ok_or_else(|| self.mismatch("(N,T,D)", input))?;
                if d % heads != 0 {
                    return Err(self.mismatch("dim divisible by heads", input));
                }
                Ok(input.clone())
            }
            Layer::ClsPool => {
                let [n, _, d] = dims3(input).ok_or_else(|| self.mismatch("(N,T,D)", input))?;
                Ok(vec![n, d])
            }
            Layer::Add => Ok(input.clone()),
        }
    }

    /// Learnable parameter count given the input shape.
    pub fn param_count(&self, input: &Shape) -> Result<u64, FlopscopeError> {
        let params = match *self {
            Layer::Conv2d {
                out_channels,
                kernel,
                groups,
                bias,
                ..
            } => {
                let [_, c, _, _] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                let weight = out_channels as u64 * (c / groups) as u64 * (kernel * kernel) as u64;
                weight + if bias { out_channels as u64 } else { 0 }
            }
            Layer::BatchNorm2d => {
                let [_, c, _, _] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                2 * c as u64
            }
            Layer::LayerNorm => {
                let d = *input.last().ok_or_else(|| self.mismatch("non-empty shape", input))?;
                2 * d as u64
            }
            Layer::Linear { out_features, bias } => {
                if input.len() < 2 {
                    return Err(self.mismatch("(..., in_features)", input));
                }
                let in_features = *input.last().unwrap() as u64;
                in_features * out_features as u64 + if bias { out_features as u64 } else { 0 }
            }
            Layer::PatchEmbed { patch, dim } => {
                let [_, c, h, w] = dims4(input).ok_or_else(|| self.mismatch("(N,C,H,W)", input))?;
                let tokens = (h / patch) * (w / patch) + 1;
                let proj = (c * patch * patch) as u64 * dim as u64 + dim as u64;
                // Class token and learned position embedding travel with
                // the patch embedding in this description.
                proj + dim as u64 + (tokens * dim) as u64
            }
            Layer::MultiHeadAttention { .. } => {
                let [_, _, d] = dims3(input).ok_or_else(|| self.mismatch("(N,T,D)", input))?;
                // QKV + output projections, all with bias.
                4 * (d * d) as u64 + 4 * d as u64
            }
            Layer::Activation(_)
            | Layer::MaxPool2d { .. }
            | Layer::GlobalAvgPool2d
            | Layer::Flatten
            | Layer::ClsPool
            | Layer::Add => 0,
        };
        Ok(params)
    }

    /// Multiply-accumulate count for one forward pass. Only genuinely
    /// multiply-accumulating layers contribute; pooling, activations and
    /// residual adds are counted as zero, matching the usual profiler
    /// convention.
    pub fn macs(&self, input: &Shape, output: &Shape) -> u64 {
        match *self {
            Layer::Conv2d {
                out_channels: _,
                kernel,
                groups,
                ..
            } => {
                // output positions x kernel volume per group
                let c_in = input[1] as u64;
                numel(output) * (c_in / groups as u64) * (kernel * kernel) as u64
            }
            Layer::BatchNorm2d | Layer::LayerNorm => numel(output),
            Layer::Linear { out_features, .. } => {
                let in_features = *input.last().unwrap() as u64;
                let positions = numel(input) / in_features;
                positions * in_features * out_features as u64
            }
            Layer::PatchEmbed { patch, dim } => {
                let c_in = input[1] as u64;
                let patches = (output[1] - 1) as u64; // class token excluded
                output[0] as u64 * patches * dim as u64 * c_in * (patch * patch) as u64
            }
            Layer::MultiHeadAttention { .. } => {
                let n = input[0] as u64;
                let t = input[1] as u64;
                let d = input[2] as u64;
                // QKV + output projections, then QK^T and attention-value.
                n * (4 * t * d * d + 2 * t * t * d)
            }
            Layer::Activation(_)
            | Layer::MaxPool2d { .. }
            | Layer::GlobalAvgPool2d
            | Layer::Flatten
            | Layer::ClsPool
            | Layer::Add => 0,
        }
    }
}

fn dims4(shape: &[usize]) -> Option<[usize; 4]> {
    <[usize; 4]>::try_from(shape).ok()
}

fn dims3(shape: &[usize]) -> Option<[usize; 3]> {
    <[usize; 3]>::try_from(shape).ok()
}

/// A tree of layers. Residual blocks carry an optional projection on the
/// skip path and emit an [Layer::Add] visit after both paths.
#[derive(Debug, Clone)]
pub enum Module {
    Layer(Layer),
    Seq(Vec<Module>),
    Residual {
        body: Vec<Module>,
        downsample: Option<Vec<Module>>,
    },
}

impl Module {
    /// Walk the module with an input shape, invoking `visit` for every
    /// leaf layer with its input and output shapes. Returns the output
    /// shape of the whole module.
    pub fn walk(
        &self,
        input: &Shape,
        visit: &mut dyn FnMut(&Layer, &Shape, &Shape),
    ) -> Result<Shape, FlopscopeError> {
        match self {
            Module::Layer(layer) => {
                let output = layer.output_shape(input)?;
                visit(layer, input, &output);
                Ok(output)
            }
            Module::Seq(children) => {
                let mut shape = input.clone();
                for child in children {
                    shape = child.walk(&shape, visit)?;
                }
                Ok(shape)
            }
            Module::Residual { body, downsample } => {
                let mut shape = input.clone();
                for child in body {
                    shape = child.walk(&shape, visit)?;
                }
                let skip = match downsample {
                    Some(children) => {
                        let mut s = input.clone();
                        for child in children {
                            s = child.walk(&s, visit)?;
                        }
                        s
                    }
                    None => input.clone(),
                };
                if skip != shape {
                    return Err(FlopscopeError::ShapeMismatch {
                        layer: "residual".to_string(),
                        expected: format!("{:?}", shape),
                        actual: format!("{:?}", skip),
                    });
                }
                let add = Layer::Add;
                visit(&add, &shape, &shape);
                Ok(shape)
            }
        }
    }
}

/// A named top-level stage of a model (e.g. "stem", "layer1", "head").
/// Stage names key the per-module cost breakdown.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub module: Module,
}

/// A complete named model: an ordered list of stages.
#[derive(Debug, Clone)]
pub struct ModelGraph {
    pub name: String,
    pub stages: Vec<Stage>,
}

impl ModelGraph {
    /// Walk all stages in order; `visit` additionally receives the stage name.
    pub fn walk(
        &self,
        input: &Shape,
        visit: &mut dyn FnMut(&str, &Layer, &Shape, &Shape),
    ) -> Result<Shape, FlopscopeError> {
        let mut shape = input.clone();
        for stage in &self.stages {
            let name = stage.name.as_str();
            shape = stage
                .module
                .walk(&shape, &mut |layer, li, lo| visit(name, layer, li, lo))?;
        }
        Ok(shape)
    }

    /// Total learnable parameters for the given input shape, summed over
    /// all parameter tensors.
    pub fn param_count(&self, input: &Shape) -> Result<u64, FlopscopeError> {
        let mut total = 0u64;
        let mut err = None;
        self.walk(input, &mut |_, layer, li, _| {
            match layer.param_count(li) {
                Ok(p) => total += p,
                Err(e) => err = Some(e),
            }
        })?;
        match err {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }
}
