use anyhow::Result;

use cam_detect::common::DEFAULT_MODEL;
use cam_detect::pipeline::opencv_io::{HighGuiDisplay, OpenCvBackend};
use cam_detect::ObjectDetection;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut detector = ObjectDetection::new(DEFAULT_MODEL)?;
    let summary = detector.run(&mut OpenCvBackend, &mut HighGuiDisplay::default())?;
    log::debug!("{:?}", summary);

    Ok(())
}
