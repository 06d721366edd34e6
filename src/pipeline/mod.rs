pub mod error;
pub mod video_processor;

#[cfg(test)]
mod tests;
