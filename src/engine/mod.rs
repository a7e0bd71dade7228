pub mod progression;
pub mod rank;
pub mod scoring;
