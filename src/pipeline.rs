mod annotate;
mod detector;
mod filter;
mod io;
mod palette;
#[cfg(feature = "opencv")]
pub mod opencv_io;

pub use annotate::*;
pub use detector::*;
pub use filter::*;
pub use io::*;
pub use palette::*;
