mod markdown;

pub use markdown::MarkdownLoader;
