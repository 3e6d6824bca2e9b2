pub mod controller;
pub mod interrupt;
pub mod video;

pub use controller::{IoController, QuitToken};
pub use interrupt::{Interrupt, InterruptSequencer};
pub use video::FrameBuffer;
