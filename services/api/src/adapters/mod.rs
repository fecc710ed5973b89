pub mod completion;

pub use completion::OpenAiCompletionAdapter;
