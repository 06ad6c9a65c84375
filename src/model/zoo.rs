//! Built-in architecture definitions: ResNet, VGG, ViT and a small test CNN.
//!
//! Layer hyperparameters follow the standard torchvision / timm variants so
//! parameter counts land on the published numbers (e.g. ResNet-18 at 11.69M,
//! ViT-B/16 at 86.6M).

use crate::model::graph::{Activation, Layer, ModelGraph, Module, Stage};

const NUM_CLASSES: usize = 1000;

fn conv(out_channels: usize, kernel: usize, stride: usize, padding: usize, bias: bool) -> Module {
    Module::Layer(Layer::Conv2d {
        out_channels,
        kernel,
        stride,
        padding,
        groups: 1,
        bias,
    })
}

fn bn() -> Module {
    Module::Layer(Layer::BatchNorm2d)
}

fn relu() -> Module {
    Module::Layer(Layer::Activation(Activation::Relu))
}

fn gelu() -> Module {
    Module::Layer(Layer::Activation(Activation::Gelu))
}

fn linear(out_features: usize) -> Module {
    Module::Layer(Layer::Linear {
        out_features,
        bias: true,
    })
}

fn stage(name: &str, children: Vec<Module>) -> Stage {
    Stage {
        name: name.to_string(),
        module: Module::Seq(children),
    }
}

// ---------------------------------------------------------------- ResNet

fn basic_block(out_channels: usize, stride: usize, project: bool) -> Module {
    let body = vec![
        conv(out_channels, 3, stride, 1, false),
        bn(),
        relu(),
        conv(out_channels, 3, 1, 1, false),
        bn(),
    ];
    let downsample = project.then(|| vec![conv(out_channels, 1, stride, 0, false), bn()]);
    Module::Residual { body, downsample }
}

fn bottleneck_block(mid_channels: usize, stride: usize, project: bool) -> Module {
    let out_channels = mid_channels * 4;
    let body = vec![
        conv(mid_channels, 1, 1, 0, false),
        bn(),
        relu(),
        conv(mid_channels, 3, stride, 1, false),
        bn(),
        relu(),
        conv(out_channels, 1, 1, 0, false),
        bn(),
    ];
    let downsample = project.then(|| vec![conv(out_channels, 1, stride, 0, false), bn()]);
    Module::Residual { body, downsample }
}

fn resnet_stage(
    name: &str,
    blocks: usize,
    channels: usize,
    stride: usize,
    bottleneck: bool,
    project_first: bool,
) -> Stage {
    let mut children = Vec::with_capacity(blocks * 2);
    for i in 0..blocks {
        let (s, project) = if i == 0 { (stride, project_first) } else { (1, false) };
        children.push(if bottleneck {
            bottleneck_block(channels, s, project)
        } else {
            basic_block(channels, s, project)
        });
        // relu after the residual add
        children.push(relu());
    }
    stage(name, children)
}

fn resnet(name: &str, layers: [usize; 4], bottleneck: bool) -> ModelGraph {
    let stem = stage(
        "stem",
        vec![
            conv(64, 7, 2, 3, false),
            bn(),
            relu(),
            Module::Layer(Layer::MaxPool2d {
                kernel: 3,
                stride: 2,
                padding: 1,
            }),
        ],
    );
    // layer1 keeps stride 1 but bottlenecks still project (64 -> 256)
    let stages = vec![
        stem,
        resnet_stage("layer1", layers[0], 64, 1, bottleneck, bottleneck),
        resnet_stage("layer2", layers[1], 128, 2, bottleneck, true),
        resnet_stage("layer3", layers[2], 256, 2, bottleneck, true),
        resnet_stage("layer4", layers[3], 512, 2, bottleneck, true),
        stage(
            "head",
            vec![Module::Layer(Layer::GlobalAvgPool2d), linear(NUM_CLASSES)],
        ),
    ];
    ModelGraph {
        name: name.to_string(),
        stages,
    }
}

pub fn resnet18() -> ModelGraph {
    resnet("resnet18", [2, 2, 2, 2], false)
}

pub fn resnet34() -> ModelGraph {
    resnet("resnet34", [3, 4, 6, 3], false)
}

pub fn resnet50() -> ModelGraph {
    resnet("resnet50", [3, 4, 6, 3], true)
}

// ------------------------------------------------------------------ VGG

fn vgg(name: &str, features: &[&[usize]]) -> ModelGraph {
    let mut stages = Vec::new();
    for (i, block) in features.iter().enumerate() {
        let mut children = Vec::new();
        for &channels in block.iter() {
            children.push(conv(channels, 3, 1, 1, true));
            children.push(relu());
        }
        children.push(Module::Layer(Layer::MaxPool2d {
            kernel: 2,
            stride: 2,
            padding: 0,
        }));
        stages.push(stage(&format!("features{}", i + 1), children));
    }
    stages.push(stage(
        "classifier",
        vec![
            Module::Layer(Layer::Flatten),
            linear(4096),
            relu(),
            linear(4096),
            relu(),
            linear(NUM_CLASSES),
        ],
    ));
    ModelGraph {
        name: name.to_string(),
        stages,
    }
}

pub fn vgg11() -> ModelGraph {
    vgg(
        "vgg11",
        &[&[64], &[128], &[256, 256], &[512, 512], &[512, 512]],
    )
}

pub fn vgg16() -> ModelGraph {
    vgg(
        "vgg16",
        &[
            &[64, 64],
            &[128, 128],
            &[256, 256, 256],
            &[512, 512, 512],
            &[512, 512, 512],
        ],
    )
}

// ------------------------------------------------------------------ ViT

fn vit(name: &str, dim: usize, depth: usize, heads: usize) -> ModelGraph {
    let mut stages = vec![stage(
        "patch_embed",
        vec![Module::Layer(Layer::PatchEmbed { patch: 16, dim })],
    )];
    for i in 0..depth {
        let attn = Module::Residual {
            body: vec![
                Module::Layer(Layer::LayerNorm),
                Module::Layer(Layer::MultiHeadAttention { heads }),
            ],
            downsample: None,
        };
        let mlp = Module::Residual {
            body: vec![
                Module::Layer(Layer::LayerNorm),
                linear(dim * 4),
                gelu(),
                linear(dim),
            ],
            downsample: None,
        };
        stages.push(stage(&format!("block{}", i), vec![attn, mlp]));
    }
    stages.push(stage(
        "head",
        vec![
            Module::Layer(Layer::LayerNorm),
            Module::Layer(Layer::ClsPool),
            linear(NUM_CLASSES),
        ],
    ));
    ModelGraph {
        name: name.to_string(),
        stages,
    }
}

pub fn vit_tiny_patch16_224() -> ModelGraph {
    vit("vit_tiny_patch16_224", 192, 12, 3)
}

pub fn vit_small_patch16_224() -> ModelGraph {
    vit("vit_small_patch16_224", 384, 12, 6)
}

pub fn vit_base_patch16_224() -> ModelGraph {
    vit("vit_base_patch16_224", 768, 12, 12)
}

// ------------------------------------------------------------- test CNN

/// Small CNN used by tests and demos; cheap to analyze at any input size
/// divisible by 2.
pub fn simple_cnn() -> ModelGraph {
    ModelGraph {
        name: "simple_cnn".to_string(),
        stages: vec![
            stage(
                "features",
                vec![
                    conv(16, 3, 1, 1, true),
                    bn(),
                    relu(),
                    Module::Layer(Layer::MaxPool2d {
                        kernel: 2,
                        stride: 2,
                        padding: 0,
                    }),
                    conv(32, 3, 1, 1, true),
                    bn(),
                    relu(),
                ],
            ),
            stage(
                "head",
                vec![Module::Layer(Layer::GlobalAvgPool2d), linear(10)],
            ),
        ],
    }
}
