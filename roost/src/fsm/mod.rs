mod pipeline;
mod states;

pub use pipeline::{Pipeline, RedirectCallback, is_redirect};
pub use states::State;
