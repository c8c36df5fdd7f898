mod xs;

pub use xs::Xs;
