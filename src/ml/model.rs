// ============================================================
// Layer 5 - Character Transformer
// ============================================================
// A small encoder-only transformer that reads a window of
// character indices and scores every vocabulary entry as the
// next character.
//
//   inputs [batch, L]
//     → token embedding + learned position embedding
//     → N × EncoderBlock (post-norm, MHA + GELU FFN)
//     → final LayerNorm
//     → hidden state at position L-1
//     → Linear(d_model → vocab_size)
//   logits [batch, vocab_size]
//
// The encoder left-pads, so the newest character is always at
// the last position and that is the state the head reads.

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct CharTransformerConfig {
    pub vocab_size:     usize,
    pub context_length: usize,
    #[config(default = 128)]
    pub d_model:        usize,
    #[config(default = 4)]
    pub num_heads:      usize,
    #[config(default = 2)]
    pub num_layers:     usize,
    #[config(default = 512)]
    pub d_ff:           usize,
    #[config(default = 0.1)]
    pub dropout:        f64,
}

impl CharTransformerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CharTransformer<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.context_length, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let head       = LinearConfig::new(self.d_model, self.vocab_size).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        CharTransformer {
            token_embedding, position_embedding, layers,
            final_norm, head, dropout,
            context_length: self.context_length,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn_output = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct CharTransformer<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub head:               Linear<B>,
    pub dropout:            Dropout,
    pub context_length:     usize,
}

impl<B: Backend> CharTransformer<B> {
    /// inputs: [batch, L] → next-character logits: [batch, vocab_size]
    pub fn forward(&self, inputs: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, seq_len] = inputs.dims();

        let tok_emb = self.token_embedding.forward(inputs);

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x);
        }
        let x = self.final_norm.forward(x); // [batch, L, d_model]

        let [_, _, d_model] = x.dims();
        let last = x
            .slice([0..batch_size, seq_len - 1..seq_len, 0..d_model])
            .reshape([batch_size, d_model]);

        self.head.forward(last)
    }

    /// Mean cross-entropy of the next-character logits against `targets`.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2, Int>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(inputs);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}
