/// Per-class confidence thresholds.
///
/// A single value applies to every class; a shorter list is padded with its last value.
#[derive(Debug, Clone, PartialEq)]
pub struct DynConf(Vec<f32>);

impl DynConf {
    pub fn new(confs: &[f32], nc: usize) -> Self {
        let fill = confs.last().copied().unwrap_or(0.25);
        let mut xs: Vec<f32> = confs.iter().take(nc).copied().collect();
        xs.resize(nc, fill);
        Self(xs)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Index<usize> for DynConf {
    type Output = f32;

    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}
