//! Mail-merge token rendering.

mod context;
mod provider;
mod renderer;

pub use context::{RecipientContext, RenderedMessage};
pub use provider::TokenProvider;
pub use renderer::{RendererConfig, TokenRenderer};
