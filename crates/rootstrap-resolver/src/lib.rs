mod expand;

pub use expand::{expand_closure, Candidate};

#[cfg(test)]
mod tests;
