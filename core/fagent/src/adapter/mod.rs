//! fagent 固有のアダプター（端末表示・対話ループ）

pub mod console;
pub mod repl;
mod stub_generator;

#[cfg(test)]
pub use stub_generator::StubGenerator;
